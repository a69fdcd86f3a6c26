pub mod emojicode;
pub mod markdown;
pub mod traits;

use std::sync::Arc;

use anyhow::Result;

use crate::emojiutf8::matcher::TokenMatcher;
use crate::emojiutf8::types::Page;

use self::emojicode::EmojiSubstitution;
use self::markdown::MarkdownRenderer;
use self::traits::Transformer;

pub struct PluginRegistry {
    transformers: Vec<Box<dyn Transformer>>,
}

impl PluginRegistry {
    pub fn standard(matcher: Arc<TokenMatcher>) -> Self {
        Self {
            transformers: vec![
                // Order matters: glyphs are substituted before markup is compiled.
                Box::new(EmojiSubstitution::new(matcher)),
                Box::new(MarkdownRenderer),
            ],
        }
    }

    pub fn with_transformer(mut self, transformer: Box<dyn Transformer>) -> Self {
        self.transformers.push(transformer);
        self
    }

    /// Run every transformer in registration order.
    pub fn transform(&self, mut page: Page) -> Result<Page> {
        for transformer in &self.transformers {
            page = transformer.transform(page)?;
        }
        Ok(page)
    }
}
