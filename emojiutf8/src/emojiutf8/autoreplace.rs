//! Replace a just-closed `:shortname:` as soon as a delimiter is typed.
//!
//! Runs after the delimiter has landed in the surface, so the char right before
//! the cursor is the delimiter and the token ends right before that.

use std::ops::Range;

use log::debug;
use serde::Serialize;

use crate::emojiutf8::autocomplete::Adapter;
use crate::emojiutf8::lexicon::Lexicon;
use crate::emojiutf8::matcher::{is_boundary_before, is_token_char};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Space,
    Period,
    Enter,
}

impl Delimiter {
    /// Map a key name (or the char it types) to a delimiter. Other keys never replace.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Space" | "Spacebar" => Some(Self::Space),
            "." | "Period" => Some(Self::Period),
            "Enter" | "\n" => Some(Self::Enter),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Space => ' ',
            Self::Period => '.',
            Self::Enter => '\n',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    /// Byte range of the token that was replaced, in the text before the edit.
    pub span: Range<usize>,
    pub shortname: String,
    pub glyph: String,
    pub cursor: usize,
}

pub fn auto_replace(
    lexicon: &Lexicon,
    surface: &mut impl Adapter,
    delimiter: Delimiter,
) -> Option<Replacement> {
    let value = surface.value();
    let cursor = surface.cursor();
    let typed = delimiter.as_char();

    let head = value.get(..cursor)?.strip_suffix(typed)?;
    let span = closing_token(head)?;
    let shortname = &head[span.clone()];
    let Some(glyph) = lexicon.glyph(shortname) else {
        debug!("No emoji for {shortname}, leaving it as typed");
        return None;
    };

    let mut inserted = format!("{glyph} ");
    if delimiter != Delimiter::Space {
        inserted.push(typed);
    }
    let cursor = span.start + inserted.len();

    let mut next = String::with_capacity(value.len() + inserted.len());
    next.push_str(&value[..span.start]);
    next.push_str(&inserted);
    next.push_str(&value[head.len() + typed.len_utf8()..]);

    let replacement = Replacement {
        span,
        shortname: shortname.to_string(),
        glyph,
        cursor,
    };
    surface.set_value(next, cursor);
    Some(replacement)
}

/// Span of a `:token:` that closes exactly at the end of `head` and opens on a boundary.
fn closing_token(head: &str) -> Option<Range<usize>> {
    let inner = head.strip_suffix(':')?;
    let name = inner
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_token_char(*c))
        .last()
        .map(|(at, _)| at)?;

    if !inner[..name].ends_with(':') {
        return None;
    }
    let open = name - 1;
    if !is_boundary_before(head, open) {
        return None;
    }
    Some(open..head.len())
}
