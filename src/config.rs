use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "TRADING_STATS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON body limit; a full 10,000-value batch is well past actix's default.
    pub max_payload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_payload_bytes: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_symbols: usize,
    pub max_symbol_len: usize,
    pub max_batch_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_symbols: 10,
            max_symbol_len: 4,
            max_batch_size: 10_000,
        }
    }
}

impl ServiceConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// `$TRADING_STATS_CONFIG`, then `config/default.toml`, then built-in
    /// defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            info!(%path, "loading config");
            return Self::from_file(path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            info!(path = DEFAULT_CONFIG_PATH, "loading config");
            return Self::from_file(DEFAULT_CONFIG_PATH);
        }
        info!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
