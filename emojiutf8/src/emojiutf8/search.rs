//! Ranked shortname lookup for editor autocomplete.
//!
//! Every entry lands in at most one bucket, tried in order:
//! 1. name: the term is a substring of the shortname (colons stripped)
//! 2. alias: the term is a substring of one of the aliases
//! 3. keyword: the term is a substring of one of the keywords
//!
//! Terms of [`SORT_THRESHOLD`] chars or more sort names and aliases by
//! shortname length and keywords alphabetically. Shorter terms match most of
//! the lexicon, so they keep lexicon order.

use std::sync::Arc;

use serde::Serialize;

use crate::emojiutf8::lexicon::{EmojiEntry, Lexicon};

pub const DEFAULT_MAX_RESULTS: usize = 100;
pub const SORT_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Name,
    Alias,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub shortname: String,
    pub glyph: String,
    pub bucket: Bucket,
}

impl Candidate {
    fn new(entry: &EmojiEntry, bucket: Bucket) -> Self {
        Self {
            shortname: entry.shortname.clone(),
            glyph: entry.glyph(),
            bucket,
        }
    }

    pub fn name(&self) -> &str {
        self.shortname.trim_matches(':')
    }
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    lexicon: Arc<Lexicon>,
    max_results: usize,
}

impl SearchEngine {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn search(&self, term: &str) -> Vec<Candidate> {
        let mut names = vec![];
        let mut aliases = vec![];
        let mut keywords = vec![];

        for entry in self.lexicon.entries() {
            if entry.name().contains(term) {
                names.push(entry);
            } else if entry
                .aliases
                .iter()
                .any(|alias| alias.trim_matches(':').contains(term))
            {
                aliases.push(entry);
            } else if entry.keywords.iter().any(|keyword| keyword.contains(term)) {
                keywords.push(entry);
            }
        }

        if term.chars().count() >= SORT_THRESHOLD {
            names.sort_by_key(|entry| entry.shortname.chars().count());
            aliases.sort_by_key(|entry| entry.shortname.chars().count());
            keywords.sort_by(|a, b| a.shortname.cmp(&b.shortname));
        }

        names
            .into_iter()
            .map(|entry| Candidate::new(entry, Bucket::Name))
            .chain(aliases.into_iter().map(|entry| Candidate::new(entry, Bucket::Alias)))
            .chain(keywords.into_iter().map(|entry| Candidate::new(entry, Bucket::Keyword)))
            .take(self.max_results)
            .collect()
    }
}
