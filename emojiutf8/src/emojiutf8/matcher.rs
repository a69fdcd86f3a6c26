use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use log::error;
use regex::{Regex, RegexBuilder};

use crate::emojiutf8::lexicon::{EMOJI_SELECTOR, Lexicon, SMILEYS, TEXT_SELECTOR, smiley};
use crate::emojiutf8::types::RenderMode;

/// Regex class for a non-word char. Must agree with [`is_word_char`].
pub const NON_WORD: &str = r"[^\p{Alphabetic}\p{N}_]";
/// Regex class for a char allowed inside a typed `:token:`. Must agree with [`is_token_char`].
pub const TOKEN_CHAR: &str = r"[\-+\p{Alphabetic}\p{N}_]";

const KEYCAP: char = '\u{20E3}';

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_token_char(c: char) -> bool {
    is_word_char(c) || c == '-' || c == '+'
}

/// True when `at` is the start of the text or follows a non-word char.
pub fn is_boundary_before(text: &str, at: usize) -> bool {
    text[..at]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c))
}

/// True when `at` is the end of the text or precedes a non-word char.
pub fn is_boundary_after(text: &str, at: usize) -> bool {
    text[at..].chars().next().map_or(true, |c| !is_word_char(c))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Unicode,
    Shortname,
    Smiley,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'t> {
    pub span: Range<usize>,
    pub source: &'t str,
    pub codepoints: Vec<char>,
    pub class: TokenClass,
    /// Lexicon shortname, when the token is (or renders as) a known entry.
    pub shortname: Option<String>,
}

impl Match<'_> {
    pub fn glyph(&self) -> String {
        self.codepoints.iter().collect()
    }

    /// `(matched text, resolved glyph)`, the pair handed to a host renderer.
    pub fn handle(&self) -> (String, String) {
        (strip_emoji_selector(self.source).into_owned(), self.glyph())
    }

    pub fn render(&self, mode: RenderMode) -> String {
        let mut out = self.glyph();
        if mode == RenderMode::Plain {
            out.push(TEXT_SELECTOR);
        }
        out
    }
}

fn strip_emoji_selector(text: &str) -> Cow<'_, str> {
    if text.contains(EMOJI_SELECTOR) {
        Cow::Owned(text.chars().filter(|c| *c != EMOJI_SELECTOR).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Scans text for raw emoji clusters, `:shortnames:` and ASCII smileys.
///
/// Precedence at any position is raw cluster, then shortname, then smiley.
/// Shortnames and smileys only match between token boundaries.
pub struct TokenMatcher {
    lexicon: Arc<Lexicon>,
    tokens: Option<Regex>,
    leads: HashSet<char>,
}

impl TokenMatcher {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        let mut shortnames: Vec<&str> = lexicon.tokens().collect();
        let mut smileys: Vec<&str> = SMILEYS.iter().map(|(key, _)| *key).collect();

        let leads = shortnames
            .iter()
            .chain(smileys.iter())
            .filter_map(|key| key.chars().next())
            .collect();

        let tokens = compile_tokens(&mut shortnames, &mut smileys);

        Self {
            lexicon,
            tokens,
            leads,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn scan<'t>(&self, text: &'t str) -> Vec<Match<'t>> {
        let mut matches = Vec::new();
        let mut pos = 0;

        while let Some(c) = text[pos..].chars().next() {
            if let Some(len) = cluster_len(&text[pos..]) {
                let source = &text[pos..pos + len];
                let codepoints: Vec<char> =
                    source.chars().filter(|c| *c != EMOJI_SELECTOR).collect();
                let shortname = self
                    .lexicon
                    .by_glyph(&codepoints)
                    .map(|entry| entry.shortname.clone());
                matches.push(Match {
                    span: pos..pos + len,
                    source,
                    codepoints,
                    class: TokenClass::Unicode,
                    shortname,
                });
                pos += len;
                continue;
            }

            if self.leads.contains(&c) && is_boundary_before(text, pos) {
                if let Some(found) = self.token_at(text, pos) {
                    pos = found.span.end;
                    matches.push(found);
                    continue;
                }
            }

            pos += c.len_utf8();
        }

        matches
    }

    fn token_at<'t>(&self, text: &'t str, pos: usize) -> Option<Match<'t>> {
        let caps = self.tokens.as_ref()?.captures(&text[pos..])?;
        let (group, class) = match caps.name("shortname") {
            Some(group) => (group, TokenClass::Shortname),
            None => (caps.name("smiley")?, TokenClass::Smiley),
        };

        let span = pos + group.start()..pos + group.end();
        let source = &text[span.clone()];
        let token = strip_emoji_selector(source);

        let (codepoints, shortname) = match class {
            TokenClass::Shortname => {
                let entry = self.lexicon.get(&token)?;
                (entry.codepoints.clone(), Some(entry.shortname.clone()))
            }
            _ => (vec![smiley(&token)?], None),
        };

        Some(Match {
            span,
            source,
            codepoints,
            class,
            shortname,
        })
    }
}

// One anchored alternation: shortnames first, smileys second, longest keys
// first within each, trailing boundary inside the pattern so a failed boundary
// falls through to the next alternative.
fn compile_tokens<'a>(shortnames: &mut [&'a str], smileys: &mut [&'a str]) -> Option<Regex> {
    let mut alternatives = vec![];
    for (group, keys) in [("shortname", shortnames), ("smiley", smileys)] {
        if keys.is_empty() {
            continue;
        }
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let body = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        alternatives.push(format!("(?P<{group}>{body})"));
    }

    let pattern = format!("^(?:{})(?:{NON_WORD}|$)", alternatives.join("|"));
    match RegexBuilder::new(&pattern).size_limit(1 << 26).build() {
        Ok(re) => Some(re),
        Err(err) => {
            error!("emoji token pattern failed to compile, shortnames disabled: {err}");
            None
        }
    }
}

fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

fn is_skin_tone(c: Option<char>) -> bool {
    matches!(c, Some('\u{1F3FB}'..='\u{1F3FF}'))
}

fn is_regional(c: Option<char>) -> bool {
    matches!(c, Some('\u{1F1C0}'..='\u{1F1FF}'))
}

/// Byte length of the raw emoji cluster starting `s`, if any.
pub fn cluster_len(s: &str) -> Option<usize> {
    let mut window: [Option<char>; 5] = [None; 5];
    for (slot, c) in window.iter_mut().zip(s.chars()) {
        *slot = Some(c);
    }

    let count = cluster_chars(&window)?;
    Some(window[..count].iter().flatten().map(|c| c.len_utf8()).sum())
}

fn cluster_chars(window: &[Option<char>; 5]) -> Option<usize> {
    let at = |i: usize| window.get(i).copied().flatten();
    let emoji_at = |i: usize| at(i) == Some(EMOJI_SELECTOR);
    let text_at = |i: usize| at(i) == Some(TEXT_SELECTOR);

    let first = at(0)?;

    if is_keycap_base(first) {
        let cap = if emoji_at(1) { 2 } else { 1 };
        if at(cap) == Some(KEYCAP) && !text_at(cap + 1) {
            return Some(cap + 1);
        }
        return emoji_at(1).then_some(2);
    }

    if first == '\u{A9}' || first == '\u{AE}' {
        return emoji_at(1).then_some(2);
    }

    if ('\u{2000}'..='\u{2FFF}').contains(&first) {
        let n = if is_skin_tone(at(1)) { 2 } else { 1 };
        if emoji_at(n) {
            return Some(n + 1);
        }

        if matches!(
            first,
            '\u{2300}'..='\u{243F}' | '\u{2600}'..='\u{27BF}' | '\u{2B00}'..='\u{2BFF}'
        ) {
            if is_skin_tone(at(1)) && !text_at(2) {
                return Some(2);
            }
            if !text_at(1) {
                return Some(1);
            }
        }
        return None;
    }

    if matches!(first, '\u{3030}' | '\u{303D}' | '\u{3297}' | '\u{3299}') {
        return emoji_at(1).then_some(2);
    }

    if ('\u{1F000}'..='\u{1FFFF}').contains(&first) {
        // A flag pair is committed once seen; it never falls back to one char.
        let n = if is_regional(Some(first)) && is_regional(at(1)) {
            2
        } else {
            let mut n = 1;
            if is_skin_tone(at(1)) {
                n += 1;
            }
            if emoji_at(n) {
                n += 1;
            }
            n
        };
        return (!text_at(n)).then_some(n);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emojiutf8::lexicon::fixture;

    fn matcher() -> TokenMatcher {
        TokenMatcher::new(Arc::new(fixture()))
    }

    fn glyphs(matcher: &TokenMatcher, text: &str) -> Vec<String> {
        matcher.scan(text).iter().map(Match::glyph).collect()
    }

    #[test]
    fn every_key_matches_alone() {
        let matcher = matcher();
        let lexicon = fixture();

        for entry in lexicon.entries() {
            let text = format!(" {} ", entry.shortname);
            let found = matcher.scan(&text);
            assert_eq!(found.len(), 1, "{}", entry.shortname);
            assert_eq!(found[0].codepoints, entry.codepoints);
            assert_eq!(found[0].class, TokenClass::Shortname);
        }

        for (key, glyph) in SMILEYS {
            let text = format!("\t{key}\n");
            let found = matcher.scan(&text);
            assert_eq!(found.len(), 1, "{key}");
            assert_eq!(found[0].codepoints, vec![*glyph]);
            assert_eq!(found[0].class, TokenClass::Smiley);
        }
    }

    #[test]
    fn tokens_inside_words_are_ignored() {
        let matcher = matcher();
        assert!(matcher.scan("foo:smile:bar").is_empty());
        assert!(matcher.scan("a:?:b").is_empty());
        assert!(matcher.scan("28-Oct").is_empty());
        assert!(matcher.scan("see http://example.org/:-\\x").is_empty());
    }

    #[test]
    fn boundaries_are_punctuation_or_edges() {
        let matcher = matcher();
        assert_eq!(glyphs(&matcher, ":smile:"), vec!["\u{1F604}"]);
        assert_eq!(glyphs(&matcher, "(:smile:)"), vec!["\u{1F604}"]);
        assert_eq!(
            glyphs(&matcher, ":smile::smile:"),
            vec!["\u{1F604}", "\u{1F604}"]
        );
        assert_eq!(glyphs(&matcher, "ok ^_^."), vec!["\u{1F604}"]);
    }

    #[test]
    fn unknown_shortnames_pass_through() {
        let matcher = matcher();
        assert!(matcher.scan(" :nope: ").is_empty());
    }

    #[test]
    fn text_selector_blocks_match() {
        let matcher = matcher();
        assert!(matcher.scan("\u{263A}\u{FE0E}").is_empty());
        assert!(matcher.scan("#\u{FE0E}").is_empty());
        assert!(matcher.scan("\u{1F600}\u{FE0E}").is_empty());
        assert!(matcher.scan("\u{1F1E8}\u{1F1F3}\u{FE0E}").is_empty());
    }

    #[test]
    fn skin_tone_before_text_selector_is_left_out() {
        let found = matcher().scan("\u{261D}\u{1F3FD}\u{FE0E}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, 0..3);
        assert_eq!(found[0].codepoints, vec!['\u{261D}']);
    }

    #[test]
    fn aliases_match_as_their_entry() {
        let found = matcher().scan("yes :+1: from :flag_cn:");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].source, ":+1:");
        assert_eq!(found[0].class, TokenClass::Shortname);
        assert_eq!(found[0].shortname.as_deref(), Some(":thumbsup:"));
        assert_eq!(found[1].glyph(), "\u{1F1E8}\u{1F1F3}");
    }

    #[test]
    fn emoji_selector_and_skin_tone_match() {
        let matcher = matcher();

        let found = matcher.scan("\u{263A}\u{FE0F}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].codepoints, vec!['\u{263A}']);

        let found = matcher.scan("\u{261D}\u{1F3FD}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].codepoints, vec!['\u{261D}', '\u{1F3FD}']);

        let found = matcher.scan("\u{270C}\u{1F3FB}\u{FE0F}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].codepoints, vec!['\u{270C}', '\u{1F3FB}']);

        let found = matcher.scan("\u{1F44D}\u{1F3FD}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].codepoints, vec!['\u{1F44D}', '\u{1F3FD}']);
    }

    #[test]
    fn bare_symbols_only_match_in_emoji_blocks() {
        let matcher = matcher();
        // U+2764 sits in the dingbat block and renders as emoji by default.
        assert_eq!(glyphs(&matcher, "\u{2764}"), vec!["\u{2764}"]);
        // U+2022 (bullet) needs an explicit emoji selector.
        assert!(matcher.scan("\u{2022}").is_empty());
        assert!(matcher.scan("\u{A9} 2024").is_empty());
        assert_eq!(glyphs(&matcher, "\u{A9}\u{FE0F}"), vec!["\u{A9}"]);
    }

    #[test]
    fn keycaps_and_flags() {
        let matcher = matcher();

        let found = matcher.scan("1\u{FE0F}\u{20E3}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].codepoints, vec!['1', '\u{20E3}']);

        assert!(matcher.scan("1\u{20E3}\u{FE0E}").is_empty());
        assert!(matcher.scan("2024").is_empty());

        let found = matcher.scan("\u{1F1E8}\u{1F1F3}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shortname.as_deref(), Some(":cn:"));
    }

    #[test]
    fn precedence_and_spans() {
        let matcher = matcher();
        let text = ":smile: \u{1F604} 8-O";
        let found = matcher.scan(text);
        let classes: Vec<TokenClass> = found.iter().map(|m| m.class).collect();
        assert_eq!(
            classes,
            vec![TokenClass::Shortname, TokenClass::Unicode, TokenClass::Smiley]
        );
        assert_eq!(&text[found[0].span.clone()], ":smile:");
        assert_eq!(&text[found[2].span.clone()], "8-O");
    }

    #[test]
    fn handle_strips_emoji_selector() {
        let matcher = matcher();
        let found = matcher.scan("\u{2764}\u{FE0F}");
        assert_eq!(
            found[0].handle(),
            ("\u{2764}".to_string(), "\u{2764}".to_string())
        );
    }

    #[test]
    fn empty_lexicon_still_matches_raw_and_smileys() {
        let matcher = TokenMatcher::new(Arc::new(Lexicon::empty()));
        assert!(matcher.scan(" :smile: ").is_empty());
        assert_eq!(glyphs(&matcher, "\u{1F604} ^_^"), vec!["\u{1F604}", "\u{1F604}"]);
    }

    #[test]
    fn boundary_helpers() {
        assert!(is_boundary_before("a :x:", 2));
        assert!(!is_boundary_before("a:x:", 1));
        assert!(is_boundary_after(":x:", 3));
        assert!(!is_boundary_after(":x:y", 3));
    }
}
