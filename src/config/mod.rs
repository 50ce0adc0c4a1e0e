// Configuration module for the relay

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "GENAI_RELAY_CONFIG";

/// Environment variable that overrides the listen port (set by most hosting platforms).
pub const PORT_ENV: &str = "PORT";

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Name of the environment variable holding the upstream API key.
    /// The key itself is never read from the config file.
    #[serde(default = "default_credential_env")]
    pub credential_env: String,

    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,

    #[serde(default)]
    pub messages: Messages,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_base_url: default_upstream_base_url(),
            credential_env: default_credential_env(),
            upstream_timeout_secs: None,
            messages: Messages::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_upstream_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_credential_env() -> String {
    "GOOGLE_APIKEY".to_string()
}

/// Client-facing error messages. Defaults are the Japanese texts the
/// front-end already displays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Messages {
    #[serde(default = "default_missing_credential")]
    pub missing_credential: String,
    #[serde(default = "default_invalid_target")]
    pub invalid_target: String,
    #[serde(default = "default_malformed_body")]
    pub malformed_body: String,
    #[serde(default = "default_upstream_failure")]
    pub upstream_failure: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            missing_credential: default_missing_credential(),
            invalid_target: default_invalid_target(),
            malformed_body: default_malformed_body(),
            upstream_failure: default_upstream_failure(),
        }
    }
}

fn default_missing_credential() -> String {
    "APIキーがサーバーに設定されていません。".to_string()
}

fn default_invalid_target() -> String {
    "無効なターゲットです。".to_string()
}

fn default_malformed_body() -> String {
    "リクエストの形式が正しくありません。".to_string()
}

fn default_upstream_failure() -> String {
    "サーバーでエラーが発生しました。".to_string()
}

impl AppConfig {
    /// Load from the file named by `GENAI_RELAY_CONFIG` (if any), then apply
    /// the `PORT` override.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} is not a valid port: {:?}", PORT_ENV, port))?;
        }

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        tracing::info!("Config loaded from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}
