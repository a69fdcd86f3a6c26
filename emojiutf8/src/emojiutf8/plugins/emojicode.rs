use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Result;

use crate::emojiutf8::matcher::TokenMatcher;
use crate::emojiutf8::types::{Page, RenderMode};

use super::traits::Transformer;

/// Replace raw emoji clusters, `:shortnames:` and smileys with their canonical glyphs.
/// Unresolvable tokens and plain text pass through untouched.
pub fn rewrite_emojis<'a>(matcher: &TokenMatcher, input: &'a str, mode: RenderMode) -> Cow<'a, str> {
    let found = matcher.scan(input);
    if found.is_empty() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    let mut after_last = 0;
    for token in found {
        out.push_str(&input[after_last..token.span.start]);
        out.push_str(&token.render(mode));
        after_last = token.span.end;
    }
    out.push_str(&input[after_last..]);

    Cow::Owned(out)
}

pub struct EmojiSubstitution {
    matcher: Arc<TokenMatcher>,
}

impl EmojiSubstitution {
    pub fn new(matcher: Arc<TokenMatcher>) -> Self {
        Self { matcher }
    }
}

impl Transformer for EmojiSubstitution {
    fn transform(&self, mut page: Page) -> Result<Page> {
        page.content = rewrite_emojis(&self.matcher, &page.content, page.mode).into_owned();
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emojiutf8::lexicon::fixture;

    fn matcher() -> TokenMatcher {
        TokenMatcher::new(Arc::new(fixture()))
    }

    #[test]
    fn rich_text_gets_bare_glyphs() {
        let matcher = matcher();
        assert_eq!(
            rewrite_emojis(&matcher, "Hi :smile: and :-\\ !", RenderMode::Xhtml),
            "Hi \u{1F604} and \u{1F615} !"
        );
        assert_eq!(
            rewrite_emojis(&matcher, ":cn:", RenderMode::Odt),
            "\u{1F1E8}\u{1F1F3}"
        );
    }

    #[test]
    fn plain_text_gets_text_selector() {
        let matcher = matcher();
        assert_eq!(
            rewrite_emojis(&matcher, "Hi :smile:", RenderMode::Plain),
            "Hi \u{1F604}\u{FE0E}"
        );
    }

    #[test]
    fn emoji_selector_is_dropped_from_raw_input() {
        let matcher = matcher();
        assert_eq!(
            rewrite_emojis(&matcher, "I \u{2764}\u{FE0F} it", RenderMode::Xhtml),
            "I \u{2764} it"
        );
    }

    #[test]
    fn untouched_text_is_borrowed() {
        let matcher = matcher();
        let text = "nothing :here: at all";
        assert!(matches!(
            rewrite_emojis(&matcher, text, RenderMode::Xhtml),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn idempotent_over_own_output() {
        let matcher = matcher();
        let source = "a :smile: b \u{263A}\u{FE0F} c :cn: d 1\u{FE0F}\u{20E3} ^_^";
        for mode in [RenderMode::Xhtml, RenderMode::Plain] {
            let once = rewrite_emojis(&matcher, source, mode).into_owned();
            let twice = rewrite_emojis(&matcher, &once, mode).into_owned();
            assert_eq!(once, twice, "{mode:?}");
        }
    }

    #[test]
    fn transformer_rewrites_page_content() {
        let plugin = EmojiSubstitution::new(Arc::new(matcher()));
        let page = plugin
            .transform(Page::new(":thumbsup: done".into(), RenderMode::Xhtml))
            .unwrap();
        assert_eq!(page.content, "\u{1F44D} done");
    }
}
