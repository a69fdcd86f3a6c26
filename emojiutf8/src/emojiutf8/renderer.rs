use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use crate::emojiutf8::autocomplete::{
    Adapter, Completer, DropdownOptions, EmojiStrategy, StrategyOptions,
};
use crate::emojiutf8::autoreplace::{Delimiter, Replacement, auto_replace};
use crate::emojiutf8::config::EmojiSettings;
use crate::emojiutf8::lexicon::Lexicon;
use crate::emojiutf8::matcher::{Match, TokenMatcher};
use crate::emojiutf8::plugins::PluginRegistry;
use crate::emojiutf8::search::{Candidate, SearchEngine};
use crate::emojiutf8::types::{Page, RenderMode, RenderedPage};

/// Everything built from one lexicon, shared across request workers.
pub struct EmojiEngine {
    pub settings: EmojiSettings,
    lexicon: Arc<Lexicon>,
    matcher: Arc<TokenMatcher>,
    search: SearchEngine,
    registry: PluginRegistry,
}

impl EmojiEngine {
    pub fn new(settings: EmojiSettings) -> Self {
        let lexicon = match settings.strategy_path.as_deref() {
            Some(path) => Lexicon::load_or_empty(path),
            None => Lexicon::bundled(),
        };
        info!("Emoji lexicon ready with {} entries", lexicon.len());
        Self::with_lexicon(settings, lexicon)
    }

    pub fn with_lexicon(settings: EmojiSettings, lexicon: Lexicon) -> Self {
        let lexicon = Arc::new(lexicon);
        let matcher = Arc::new(TokenMatcher::new(Arc::clone(&lexicon)));
        let search = SearchEngine::new(Arc::clone(&lexicon)).with_max_results(settings.max_results);

        Self {
            registry: PluginRegistry::standard(Arc::clone(&matcher)),
            settings,
            lexicon,
            matcher,
            search,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn render(&self, text: &str, mode: RenderMode) -> Result<RenderedPage> {
        let page = self
            .registry
            .transform(Page::new(text.to_string(), mode))
            .with_context(|| format!("rendering {} chars as {mode:?}", text.len()))?;
        Ok(page.into())
    }

    pub fn scan<'t>(&self, text: &'t str) -> Vec<Match<'t>> {
        self.matcher.scan(text)
    }

    pub fn search(&self, term: &str) -> Vec<Candidate> {
        self.search.search(term)
    }

    pub fn strategy(&self) -> EmojiStrategy {
        EmojiStrategy::new(self.search.clone())
    }

    /// A fresh editor completer wired to this lexicon.
    pub fn completer(&self) -> Completer<Candidate> {
        let mut completer = Completer::new(DropdownOptions {
            footer: self.settings.footer.clone(),
            ..DropdownOptions::default()
        });
        let debounce =
            (self.settings.debounce_ms > 0).then(|| Duration::from_millis(self.settings.debounce_ms));
        completer.register(
            Box::new(self.strategy()),
            StrategyOptions {
                max_count: self.settings.max_results,
                debounce,
                ..StrategyOptions::default()
            },
        );
        completer
    }

    pub fn auto_replace(
        &self,
        surface: &mut impl Adapter,
        delimiter: Delimiter,
    ) -> Option<Replacement> {
        auto_replace(&self.lexicon, surface, delimiter)
    }

    pub fn asset_base(&self) -> &str {
        self.settings.asset_base()
    }
}
