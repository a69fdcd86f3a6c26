use std::path::Path;

use confik::{Configuration, EnvSource};
use serde::{Deserialize, Serialize};

use self::yaml::YamlFileSource;

pub const LOCAL_ASSET_BASE: &str = "/lib/plugins/emojiutf8/";
pub const CDN_ASSET_BASE: &str = "//cdn.jsdelivr.net/emojione/";

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            cors_origins: vec!["*".into()],
        }
    }
}

/// Where editor pages load the emoji sprite and stylesheet from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Configuration)]
#[serde(rename_all = "lowercase")]
#[confik(forward(serde(rename_all = "lowercase")))]
pub enum AssetSource {
    Local,
    Cdn,
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct EmojiSettings {
    /// Lexicon JSON to load instead of the bundled Unicode table.
    #[serde(default)]
    pub strategy_path: Option<String>,
    #[serde(default = "default_asset_source")]
    pub assetsrc: AssetSource,
    #[serde(default)]
    pub asseturi: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Autocomplete debounce window; `0` searches on every keystroke.
    #[serde(default)]
    pub debounce_ms: u64,
    /// Last row of the autocomplete dropdown, e.g. a "browse all" link.
    #[serde(default)]
    pub footer: Option<String>,
}

fn default_asset_source() -> AssetSource {
    AssetSource::Local
}

fn default_max_results() -> usize {
    crate::emojiutf8::search::DEFAULT_MAX_RESULTS
}

impl Default for EmojiSettings {
    fn default() -> Self {
        Self {
            strategy_path: None,
            assetsrc: default_asset_source(),
            asseturi: None,
            max_results: default_max_results(),
            debounce_ms: 0,
            footer: None,
        }
    }
}

impl EmojiSettings {
    /// Base URL for emoji assets. An external source without a URI falls back to the bundled copy.
    pub fn asset_base(&self) -> &str {
        match self.assetsrc {
            AssetSource::Local => LOCAL_ASSET_BASE,
            AssetSource::Cdn => CDN_ASSET_BASE,
            AssetSource::External => self
                .asseturi
                .as_deref()
                .filter(|uri| !uri.trim().is_empty())
                .unwrap_or(LOCAL_ASSET_BASE),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Configuration)]
pub struct SiteConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub emoji: EmojiSettings,
}

impl SiteConfig {
    /// Load configuration from `config.yml` (if present) and environment variables.
    /// Falls back to the compiled-in defaults when parsing fails.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.yml");
        let mut builder = SiteConfig::builder();

        if config_path.exists() {
            builder.override_with(YamlFileSource::new(config_path));
        }

        builder.override_with(EnvSource::new());

        match builder.try_build() {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Failed to load config.yml or env overrides: {err}. Using defaults.");
                SiteConfig::default()
            }
        }
    }
}

mod yaml {
    use std::error::Error;
    use std::path::PathBuf;

    use confik::Source;
    use serde::de::DeserializeOwned;

    #[derive(Debug)]
    pub struct YamlFileSource {
        path: PathBuf,
    }

    impl YamlFileSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl<T> Source<T> for YamlFileSource
    where
        T: DeserializeOwned + confik::ConfigurationBuilder,
    {
        fn allows_secrets(&self) -> bool {
            false
        }

        fn provide(&self) -> Result<T, Box<dyn Error + Sync + Send>> {
            let contents = std::fs::read_to_string(&self.path)?;
            Ok(serde_yaml::from_str(&contents)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(assetsrc: AssetSource, asseturi: Option<&str>) -> EmojiSettings {
        EmojiSettings {
            assetsrc,
            asseturi: asseturi.map(str::to_string),
            ..EmojiSettings::default()
        }
    }

    #[test]
    fn asset_base_follows_the_source() {
        assert_eq!(settings(AssetSource::Local, None).asset_base(), LOCAL_ASSET_BASE);
        assert_eq!(
            settings(AssetSource::Cdn, Some("https://ignored/")).asset_base(),
            CDN_ASSET_BASE
        );
        assert_eq!(
            settings(AssetSource::External, Some("https://assets.example/emoji/")).asset_base(),
            "https://assets.example/emoji/"
        );
    }

    #[test]
    fn external_without_uri_uses_bundled_assets() {
        assert_eq!(settings(AssetSource::External, None).asset_base(), LOCAL_ASSET_BASE);
        assert_eq!(
            settings(AssetSource::External, Some("  ")).asset_base(),
            LOCAL_ASSET_BASE
        );
    }

    #[test]
    fn yaml_sections_fill_in_defaults() {
        let config: SiteConfig = serde_yaml::from_str(
            "server:\n  host: 0.0.0.0\n  port: 9000\nemoji:\n  assetsrc: cdn\n  debounce_ms: 150\n",
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.emoji.assetsrc, AssetSource::Cdn);
        assert_eq!(config.emoji.debounce_ms, 150);
        assert_eq!(config.emoji.max_results, 100);
        assert!(config.emoji.strategy_path.is_none());
        assert!(config.emoji.footer.is_none());
    }

    #[test]
    fn defaults_are_usable() {
        let config = SiteConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.emoji.asset_base(), LOCAL_ASSET_BASE);
    }
}
