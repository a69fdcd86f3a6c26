use serde::{Deserialize, Serialize};

/// Output target of a render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Primary rich-text (HTML) output.
    #[default]
    Xhtml,
    Odt,
    /// Everything else; glyphs get a trailing text presentation selector.
    #[serde(other)]
    Plain,
}

impl RenderMode {
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "xhtml" => RenderMode::Xhtml,
            "odt" => RenderMode::Odt,
            _ => RenderMode::Plain,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub mode: RenderMode,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Page {
    pub fn new(content: String, mode: RenderMode) -> Self {
        Self {
            mode,
            content,
            html: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RenderedPage {
    pub mode: RenderMode,
    pub output: String,
}

impl From<Page> for RenderedPage {
    fn from(page: Page) -> Self {
        let output = page.html.unwrap_or(page.content);

        RenderedPage {
            mode: page.mode,
            output,
        }
    }
}
