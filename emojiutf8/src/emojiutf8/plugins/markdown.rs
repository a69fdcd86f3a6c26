use anyhow::{Result, anyhow};

use crate::emojiutf8::types::{Page, RenderMode};

use super::traits::Transformer;

/// Host renderer for rich-text output. Other modes keep the substituted text as is.
pub struct MarkdownRenderer;

impl Transformer for MarkdownRenderer {
    fn transform(&self, mut page: Page) -> Result<Page> {
        if page.mode != RenderMode::Xhtml {
            return Ok(page);
        }

        let rendered = markdown::to_html_with_options(
            &page.content,
            &markdown::Options {
                parse: markdown::ParseOptions::gfm(),
                compile: markdown::CompileOptions {
                    allow_dangerous_html: true,
                    ..markdown::CompileOptions::gfm()
                },
            },
        )
        .map_err(|e| anyhow!(e.to_string()))?;
        page.html = Some(rendered);
        Ok(page)
    }
}
