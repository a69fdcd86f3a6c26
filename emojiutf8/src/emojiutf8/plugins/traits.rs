use anyhow::Result;

use crate::emojiutf8::types::Page;

pub trait Transformer: Send + Sync {
    fn transform(&self, page: Page) -> Result<Page>;
}
