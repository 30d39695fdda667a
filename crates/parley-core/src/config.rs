use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Top-level configuration for Parley.
///
/// Loaded from `~/.parley/config.toml` by default. Every section falls back to
/// its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from a TOML file, treating a missing file as the
    /// defaults. A file that exists but cannot be read or parsed is an error.
    pub fn load_if_present(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the current configuration to a TOML file, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Conversation and routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Number of turns kept in the visible transcript.
    pub retention_turns: usize,
    /// Upper bound for a single capability call, in seconds.
    pub capability_timeout_secs: u64,
    /// Extra canned replies, keyed by exact phrase. Entries here override the
    /// built-in greetings with the same phrase.
    pub replies: BTreeMap<String, String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            retention_turns: 8,
            capability_timeout_secs: 10,
            replies: BTreeMap::new(),
        }
    }
}

/// Endpoints and HTTP settings for the capability gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Weather service base URL; the city is appended as a path segment.
    pub weather_url: String,
    /// wttr.in format string.
    pub weather_format: String,
    /// Exchange-rate service base URL; the source currency is appended.
    pub rates_url: String,
    /// Random joke endpoint.
    pub joke_url: String,
    /// LibreTranslate-compatible translation endpoint.
    pub translate_url: String,
    /// Optional API key sent with translation requests.
    pub translate_api_key: Option<String>,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// User-Agent header for outgoing requests.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            weather_url: "http://wttr.in".to_string(),
            weather_format: "%C+%t".to_string(),
            rates_url: "https://open.er-api.com/v6/latest".to_string(),
            joke_url: "https://official-joke-api.appspot.com/random_joke".to_string(),
            translate_url: "https://libretranslate.com/translate".to_string(),
            translate_api_key: None,
            request_timeout_secs: 8,
            user_agent: concat!("parley/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
