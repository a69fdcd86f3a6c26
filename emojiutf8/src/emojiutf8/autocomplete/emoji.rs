use anyhow::Result;
use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::emojiutf8::matcher::{NON_WORD, TOKEN_CHAR};
use crate::emojiutf8::search::{Candidate, SearchEngine};

use super::MatchInfo;
use super::strategy::Strategy;

static TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(^|{NON_WORD}):([\-+]?{TOKEN_CHAR}+)$")).expect("emoji trigger regex")
});

/// Completes `:partial` shortnames from the lexicon.
pub struct EmojiStrategy {
    engine: SearchEngine,
}

impl EmojiStrategy {
    pub fn new(engine: SearchEngine) -> Self {
        Self { engine }
    }
}

impl Strategy<Candidate> for EmojiStrategy {
    fn pattern(&self) -> &Regex {
        &TRIGGER
    }

    fn index(&self) -> usize {
        2
    }

    fn search(&self, term: &str) -> BoxFuture<'static, Result<Vec<Candidate>>> {
        future::ready(Ok(self.engine.search(term))).boxed()
    }

    fn template(&self, candidate: &Candidate) -> String {
        format!("{} {}", candidate.glyph, candidate.shortname)
    }

    fn replace(&self, info: &MatchInfo, candidate: &Candidate) -> String {
        format!("{}{} ", info.group(1), candidate.glyph)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::emojiutf8::autocomplete::{
        Adapter, Command, Completer, DropdownOptions, Reaction, State, StrategyOptions, Textarea,
    };
    use crate::emojiutf8::lexicon::fixture;

    fn completer() -> Completer<Candidate> {
        let mut completer = Completer::new(DropdownOptions::default());
        completer.register(
            Box::new(EmojiStrategy::new(SearchEngine::new(Arc::new(fixture())))),
            StrategyOptions::default(),
        );
        completer
    }

    #[test]
    fn trigger_needs_a_boundary_and_a_term() {
        let term = |text: &str| {
            TRIGGER
                .captures(text)
                .and_then(|c| c.get(2))
                .map(|m| m.as_str().to_string())
        };
        assert_eq!(term(":smi").as_deref(), Some("smi"));
        assert_eq!(term("say (:+1").as_deref(), Some("+1"));
        assert_eq!(term("ab:smi"), None);
        assert_eq!(term("ends with :"), None);
        assert_eq!(term(":smi more"), None);
    }

    #[tokio::test]
    async fn typing_then_enter_inserts_the_glyph() {
        let mut completer = completer();
        let mut surface = Textarea::new("Good day :smi");
        let lookup = completer.trigger(&surface).unwrap();
        assert!(completer.apply(lookup.run().await));
        assert_eq!(
            completer.dropdown().rendered()[0],
            "\u{1F604} :smile:".to_string()
        );

        completer.command(Command::Down, &mut surface);
        assert!(matches!(
            completer.command(Command::Enter, &mut surface),
            Reaction::Consumed
        ));
        assert_eq!(surface.value(), "Good day \u{1F604} ");
        assert_eq!(surface.cursor(), surface.value().len());
        assert_eq!(completer.state(), State::Idle);
    }

    #[tokio::test]
    async fn unknown_terms_keep_the_dropdown_closed() {
        let mut completer = completer();
        let lookup = completer.trigger(&Textarea::new(":zzz")).unwrap();
        assert!(!completer.apply(lookup.run().await));
        assert!(!completer.dropdown().is_shown());
    }
}
