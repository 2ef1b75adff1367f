//! Configuration management for play-ledger.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values
//!
//! The record store URL and access key have no defaults. Starting without
//! either is fatal.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::store::RestConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Remote record store.
    pub store: StoreSection,
    /// Device-local state.
    pub device: DeviceSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Record store section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Service endpoint URL.
    pub url: Option<String>,
    /// Access key.
    pub api_key: Option<String>,
    /// Table holding session rows.
    pub table: String,
    /// Owner tag written on new sessions.
    pub user_id: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: "sessions".to_string(),
            user_id: None,
            timeout_secs: 15,
        }
    }
}

/// Device-local state section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    /// Directory holding the active session pointer.
    pub data_dir: PathBuf,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".play-ledger"),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("PLAY_LEDGER_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("PLAY_LEDGER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Some(url) = var("PLAY_LEDGER_STORE_URL").and_then(non_empty) {
            self.store.url = Some(url);
        }

        if let Some(key) = var("PLAY_LEDGER_STORE_KEY").and_then(non_empty) {
            self.store.api_key = Some(key);
        }

        if let Some(user) = var("PLAY_LEDGER_USER_ID").and_then(non_empty) {
            self.store.user_id = Some(user);
        }

        if let Some(dir) = var("PLAY_LEDGER_DATA_DIR").and_then(non_empty) {
            self.device.data_dir = PathBuf::from(dir);
        }

        if let Some(level) = var("PLAY_LEDGER_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref url) = args.store_url {
            self.store.url = Some(url.clone());
        }

        if let Some(ref key) = args.store_key {
            self.store.api_key = Some(key.clone());
        }

        if let Some(ref user) = args.user_id {
            self.store.user_id = Some(user.clone());
        }

        if let Some(ref dir) = args.data_dir {
            self.device.data_dir = dir.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Connection settings for the record store.
    pub fn rest_config(&self) -> Result<RestConfig, ConfigError> {
        let url = self
            .store
            .url
            .clone()
            .ok_or(ConfigError::MissingStoreUrl)?;
        let key = self
            .store
            .api_key
            .clone()
            .ok_or(ConfigError::MissingStoreKey)?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidStoreUrl(url));
        }

        Ok(RestConfig::new(url, key)
            .with_table(self.store.table.clone())
            .with_timeout(Duration::from_secs(self.store.timeout_secs.max(1))))
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        Ok(ServerConfig::new(host.to_string(), self.server.port))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// No record store URL configured.
    MissingStoreUrl,
    /// No record store access key configured.
    MissingStoreKey,
    /// Record store URL is not http(s).
    InvalidStoreUrl(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::MissingStoreUrl => write!(
                f,
                "record store URL is missing (set PLAY_LEDGER_STORE_URL or --store-url)"
            ),
            Self::MissingStoreKey => write!(
                f,
                "record store access key is missing (set PLAY_LEDGER_STORE_KEY or --store-key)"
            ),
            Self::InvalidStoreUrl(url) => write!(f, "invalid record store URL: {}", url),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.table, "sessions");
        assert!(config.store.url.is_none());
        assert_eq!(config.device.data_dir, PathBuf::from(".play-ledger"));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "store": {
                "url": "https://example.supabase.co",
                "api_key": "anon",
                "user_id": "player-1"
            },
            "device": { "data_dir": "/var/lib/play-ledger" }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.user_id.as_deref(), Some("player-1"));
        assert_eq!(config.store.table, "sessions"); // Default
        assert_eq!(
            config.device.data_dir,
            PathBuf::from("/var/lib/play-ledger")
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_vars(vars(&[
            ("PLAY_LEDGER_STORE_URL", "https://env.example"),
            ("PLAY_LEDGER_STORE_KEY", "env-key"),
            ("PLAY_LEDGER_PORT", "4100"),
            ("PLAY_LEDGER_DATA_DIR", "/tmp/pl"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.store.url.as_deref(), Some("https://env.example"));
        assert_eq!(config.store.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.device.data_dir, PathBuf::from("/tmp/pl"));
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = Config::default();
        config.store.api_key = Some("from-file".into());
        config.apply_vars(vars(&[("PLAY_LEDGER_STORE_KEY", "  ")]));
        assert_eq!(config.store.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_specific_log_level_wins() {
        let mut config = Config::default();
        config.apply_vars(vars(&[
            ("PLAY_LEDGER_LOG_LEVEL", "warn"),
            ("RUST_LOG", "trace"),
        ]));
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            host: Some("192.168.1.1".parse().unwrap()),
            port: Some(5000),
            store_url: Some("https://cli.example".to_string()),
            store_key: Some("cli-key".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.store.url.as_deref(), Some("https://cli.example"));
        assert_eq!(config.store.api_key.as_deref(), Some("cli-key"));
    }

    #[test]
    fn test_args_without_host_keep_env() {
        let mut config = Config::default();
        config.apply_vars(vars(&[("PLAY_LEDGER_PORT", "4100")]));
        config.apply_args(&Args::default());
        assert_eq!(config.server.port, 4100);
    }

    #[test]
    fn test_missing_store_is_fatal() {
        let mut config = Config::default();
        assert!(matches!(
            config.rest_config(),
            Err(ConfigError::MissingStoreUrl)
        ));

        config.store.url = Some("https://example.test".into());
        assert!(matches!(
            config.rest_config(),
            Err(ConfigError::MissingStoreKey)
        ));

        config.store.api_key = Some("k".into());
        let rest = config.rest_config().unwrap();
        assert_eq!(rest.table, "sessions");
        assert_eq!(rest.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_store_url() {
        let mut config = Config::default();
        config.store.url = Some("ftp://example.test".into());
        config.store.api_key = Some("k".into());
        assert!(matches!(
            config.rest_config(),
            Err(ConfigError::InvalidStoreUrl(_))
        ));
    }

    #[test]
    fn test_to_server_config() {
        let config = Config::default();
        let server_config = config.to_server_config().unwrap();

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 3000);
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not-an-ip".to_string();

        assert!(config.to_server_config().is_err());
    }
}
