pub mod autocomplete;
pub mod autoreplace;
pub mod config;
pub mod lexicon;
pub mod matcher;
pub mod plugins;
pub mod renderer;
pub mod search;
pub mod types;

pub use config::SiteConfig;
pub use lexicon::{DataError, Lexicon};
pub use matcher::TokenMatcher;
pub use renderer::EmojiEngine;
pub use types::{RenderMode, RenderedPage};
