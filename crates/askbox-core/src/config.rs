use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::format::FormatRules;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskboxConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default)]
    pub format: FormatRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_ask_path")]
    pub ask_path: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Fixed strings shown in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Placeholder shown while a request is in flight.
    #[serde(default = "default_loading")]
    pub loading: String,

    /// Shown when the backend answers without an `answer`.
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Shown when the request fails.
    #[serde(default = "default_error")]
    pub error: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_ask_path() -> String {
    "/ask".to_string()
}
fn default_timeout() -> u64 {
    120
}
fn default_loading() -> String {
    "Carregando resposta...".to_string()
}
fn default_fallback() -> String {
    "Não consegui responder.".to_string()
}
fn default_error() -> String {
    "Erro ao conectar ao servidor.".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ask_path: default_ask_path(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            loading: default_loading(),
            fallback: default_fallback(),
            error: default_error(),
        }
    }
}

impl ServerConfig {
    /// Full URL of the question endpoint.
    pub fn ask_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.ask_path.starts_with('/') {
            format!("{}{}", base, self.ask_path)
        } else {
            format!("{}/{}", base, self.ask_path)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl AskboxConfig {
    /// Load config from ~/.config/askbox/config.toml, creating defaults if missing.
    pub fn load() -> crate::error::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = AskboxConfig::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load config from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AskboxError::Config(format!(
                "Failed to read config {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&contents)
    }

    /// Parse config from TOML text.
    pub fn parse(contents: &str) -> crate::error::Result<Self> {
        toml::from_str(contents).map_err(|e| {
            crate::error::AskboxError::Config(format!("Failed to parse config: {e}"))
        })
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            crate::error::AskboxError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> crate::error::Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            crate::error::AskboxError::Config("Could not determine config directory".into())
        })?;
        Ok(config_dir.join("askbox").join("config.toml"))
    }
}
