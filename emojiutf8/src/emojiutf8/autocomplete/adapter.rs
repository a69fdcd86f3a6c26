use std::sync::Arc;

use super::MatchInfo;
use super::strategy::StrategyHandle;

/// An editable text surface with a caret. Cursor positions are byte offsets.
pub trait Adapter {
    fn value(&self) -> &str;

    fn cursor(&self) -> usize;

    fn set_value(&mut self, value: String, cursor: usize);

    /// First strategy whose pattern matches the text up to the cursor.
    fn match_info<C: Clone + Send + 'static>(
        &self,
        strategies: &[Arc<StrategyHandle<C>>],
    ) -> Option<MatchInfo> {
        let value = self.value();
        let cursor = self.cursor();
        let head = value.get(..cursor)?;

        strategies.iter().enumerate().find_map(|(index, handle)| {
            let strategy = handle.strategy();
            if !strategy.context(value) {
                return None;
            }

            let captures = strategy.pattern().captures(head)?;
            let whole = captures.get(0)?;
            if whole.end() != cursor {
                return None;
            }
            let term = captures.get(strategy.index())?.as_str().to_string();

            Some(MatchInfo {
                strategy: index,
                span: whole.range(),
                groups: captures
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect(),
                term,
                generation: 0,
            })
        })
    }

    /// Replace the matched span and park the cursor after the new text.
    /// Returns the new cursor, or `None` when the span no longer holds the match.
    fn replace_text(&mut self, info: &MatchInfo, replacement: &str) -> Option<usize> {
        let value = self.value();
        if value.get(info.span.clone())? != info.matched() {
            return None;
        }

        let cursor = info.span.start + replacement.len();
        let mut next = String::with_capacity(value.len() + replacement.len());
        next.push_str(&value[..info.span.start]);
        next.push_str(replacement);
        next.push_str(&value[info.span.end..]);

        self.set_value(next, cursor);
        Some(cursor)
    }
}

/// In-memory surface, the stand-in for an editor textarea.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Textarea {
    value: String,
    cursor: usize,
}

impl Textarea {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    /// Out-of-range or mid-character cursors are pulled back to the last char boundary.
    pub fn with_cursor(value: impl Into<String>, cursor: usize) -> Self {
        let value = value.into();
        let mut cursor = cursor.min(value.len());
        while !value.is_char_boundary(cursor) {
            cursor -= 1;
        }
        Self { value, cursor }
    }

    /// Type `text` at the cursor.
    pub fn insert(&mut self, text: &str) {
        self.value.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    pub fn into_inner(self) -> (String, usize) {
        (self.value, self.cursor)
    }
}

impl Adapter for Textarea {
    fn value(&self) -> &str {
        &self.value
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_value(&mut self, value: String, cursor: usize) {
        self.value = value;
        self.cursor = cursor;
    }
}
