use crate::error::{Result, RolodexError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_request_body_mb")]
    pub max_request_body_mb: usize,
    /// Upper bound on the number of records returned by any filter endpoint.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "redis" for Redis Stack, "memory" for the in-process test backend.
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_store_url")]
    pub url: String,
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    std::env::var("ROLODEX_HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
}
fn default_port() -> u16 {
    std::env::var("ROLODEX_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}
fn default_request_timeout() -> u64 {
    std::env::var("ROLODEX_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}
fn default_max_request_body_mb() -> usize {
    std::env::var("ROLODEX_MAX_REQUEST_BODY_MB")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2)
}
fn default_max_results() -> usize {
    std::env::var("ROLODEX_MAX_RESULTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100)
}
fn default_backend() -> String {
    std::env::var("ROLODEX_STORE_BACKEND").unwrap_or_else(|_| "redis".to_string())
}
fn default_store_url() -> String {
    std::env::var("REDIS_URL")
        .or_else(|_| std::env::var("REDIS_CONNECTION_STRING"))
        .unwrap_or_else(|_| "redis://localhost:6379".to_string())
}
fn default_index_name() -> String {
    std::env::var("ROLODEX_INDEX_NAME").unwrap_or_else(|_| "person-idx".to_string())
}
fn default_key_prefix() -> String {
    std::env::var("ROLODEX_KEY_PREFIX").unwrap_or_else(|_| "person:".to_string())
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    std::env::var("ROLODEX_LOG_FORMAT").unwrap_or_else(|_| "json".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_request_body_mb: default_max_request_body_mb(),
            max_results: default_max_results(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_store_url(),
            index_name: default_index_name(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults.
    /// After loading, env var overrides are applied so that:
    /// env var > TOML file > defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    RolodexError::Config(format!("failed to read config file {p}: {e}"))
                })?;
                toml::from_str(&content)
                    .map_err(|e| RolodexError::Config(format!("failed to parse config: {e}")))?
            }
            None => Config::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of file/default values.
    /// This ensures env vars always take priority over TOML settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ROLODEX_HOST") {
            self.server.host = v;
        }
        if let Some(v) = std::env::var("ROLODEX_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.port = v;
        }
        if let Some(v) = std::env::var("ROLODEX_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.request_timeout_secs = v;
        }
        if let Some(v) = std::env::var("ROLODEX_MAX_REQUEST_BODY_MB")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.max_request_body_mb = v;
        }
        if let Some(v) = std::env::var("ROLODEX_MAX_RESULTS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.max_results = v;
        }
        if let Ok(v) = std::env::var("ROLODEX_STORE_BACKEND") {
            self.store.backend = v;
        }
        if let Ok(v) = std::env::var("REDIS_URL") {
            self.store.url = v;
        }
        if let Ok(v) = std::env::var("ROLODEX_INDEX_NAME") {
            self.store.index_name = v;
        }
        if let Ok(v) = std::env::var("ROLODEX_KEY_PREFIX") {
            self.store.key_prefix = v;
        }
        if let Ok(v) = std::env::var("ROLODEX_LOG_FORMAT") {
            self.logging.format = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.store.backend, "redis");
        assert_eq!(config.store.index_name, "person-idx");
        assert_eq!(config.store.key_prefix, "person:");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9090

            [store]
            backend = "memory"
            index_name = "people-test-idx"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.store.index_name, "people-test-idx");
        // untouched sections fall back to defaults
        assert_eq!(config.store.key_prefix, "person:");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"127.0.0.1\"\nmax_results = 25").unwrap();
        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.max_results, 25);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Config::load(Some("/nonexistent/rolodex.toml")).unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("config"));
    }
}
