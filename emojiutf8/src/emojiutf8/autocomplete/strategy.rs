use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use futures_util::future::BoxFuture;
use regex::Regex;

use super::MatchInfo;

/// One trigger pattern plus everything needed to complete it.
pub trait Strategy<C>: Send + Sync {
    /// Pattern evaluated against the text up to the cursor.
    fn pattern(&self) -> &Regex;

    /// Capture group holding the query term.
    fn index(&self) -> usize {
        1
    }

    /// Gate evaluated before the pattern, e.g. to skip code blocks.
    fn context(&self, _text: &str) -> bool {
        true
    }

    fn search(&self, term: &str) -> BoxFuture<'static, Result<Vec<C>>>;

    fn template(&self, candidate: &C) -> String;

    /// Text that replaces the whole pattern match once `candidate` is chosen.
    fn replace(&self, info: &MatchInfo, candidate: &C) -> String;
}

#[derive(Debug, Clone)]
pub struct StrategyOptions {
    pub max_count: usize,
    pub debounce: Option<Duration>,
    pub cache: bool,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            max_count: 100,
            debounce: None,
            cache: true,
        }
    }
}

/// A registered strategy with its options and query cache.
pub struct StrategyHandle<C> {
    strategy: Box<dyn Strategy<C>>,
    options: StrategyOptions,
    cache: Mutex<HashMap<String, Vec<C>>>,
}

impl<C: Clone + Send + 'static> StrategyHandle<C> {
    pub fn new(strategy: Box<dyn Strategy<C>>, options: StrategyOptions) -> Self {
        Self {
            strategy,
            options,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn strategy(&self) -> &dyn Strategy<C> {
        self.strategy.as_ref()
    }

    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }

    fn cached(&self, term: &str) -> Option<Vec<C>> {
        if !self.options.cache {
            return None;
        }
        self.cache.lock().ok()?.get(term).cloned()
    }

    fn remember(&self, term: &str, found: &[C]) {
        if !self.options.cache {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(term.to_string(), found.to_vec());
        }
    }

    /// Search `term`, serving repeated queries from the cache.
    pub async fn find_matches(&self, term: &str) -> Result<Vec<C>> {
        if let Some(hit) = self.cached(term) {
            return Ok(hit);
        }
        let found = self.strategy.search(term).await?;
        self.remember(term, &found);
        Ok(found)
    }
}
