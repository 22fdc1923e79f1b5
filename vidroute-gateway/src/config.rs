//! # Gateway Configuration
//!
//! TOML-based configuration with environment variable overrides. The file is
//! optional: a missing file means defaults, so the gateway starts with
//! nothing but `NODE_API_URL` and `API_KEY` in the environment.
//!
//! ## Environment Variables
//!
//! - `NODE_API_URL`: base URL of the downstream execution API
//!   (default `http://localhost:3000`)
//! - `API_KEY`: shared key forwarded as `X-API-KEY` (default `testkey`)
//! - `VIDROUTE_HOST` / `VIDROUTE_PORT`: server bind overrides
//! - `VIDROUTE_LOG_LEVEL`: logging level override
//! - `VIDROUTE_CAPABILITIES_FILE`: path to the JSON capability overlay
//!
//! The per-provider key variables (`RUNWAY_API_KEY`, `PIKA_API_KEY`,
//! `GEMINI_API_KEY`) are read by the health checker directly, not through
//! this config.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Downstream execution API settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Overall request timeout, in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Base URL of the execution API that actually renders jobs.
    pub node_api_url: String,
    /// Shared key forwarded as `X-API-KEY` on every downstream call.
    pub api_key: String,
    /// Optional JSON document overlaying the built-in capability table.
    #[serde(default)]
    pub capabilities_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            timeout_secs: 30,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            node_api_url: "http://localhost:3000".to_string(),
            api_key: "testkey".to_string(),
            capabilities_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            execution: ExecutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path` when the file exists, otherwise start
    /// from defaults. Environment overrides and validation apply either way.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path, "no configuration file found, using defaults");
                Config::default()
            }
            Err(e) => return Err(e.into()),
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(url) = env::var("NODE_API_URL") {
            if !url.is_empty() {
                self.execution.node_api_url = url;
            }
        }
        if let Ok(key) = env::var("API_KEY") {
            if !key.is_empty() {
                self.execution.api_key = key;
            }
        }
        if let Ok(host) = env::var("VIDROUTE_HOST") {
            if !host.is_empty() {
                self.server.host = host;
            }
        }
        if let Ok(port) = env::var("VIDROUTE_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid VIDROUTE_PORT: {port}"))?;
        }
        if let Ok(level) = env::var("VIDROUTE_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
        if let Ok(path) = env::var("VIDROUTE_CAPABILITIES_FILE") {
            if !path.is_empty() {
                self.execution.capabilities_file = Some(PathBuf::from(path));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be between 1 and 65535"));
        }
        if self.server.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Server timeout cannot be 0"));
        }

        let url = &self.execution.node_api_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "node_api_url must start with http:// or https://, got {url}"
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Use: {:?}",
                self.logging.level,
                valid_levels
            ));
        }
        Ok(())
    }

    pub fn server_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.execution.node_api_url, "http://localhost:3000");
        assert_eq!(config.execution.api_key, "testkey");
        assert_eq!(config.server_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.execution.api_key, "testkey");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_execution_url_is_rejected() {
        let mut config = Config::default();
        config.execution.node_api_url = "localhost:3000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_overrides_apply() {
        let mut config = Config::default();
        std::env::set_var("NODE_API_URL", "http://execution.internal:3000");
        std::env::set_var("API_KEY", "prod-key");
        std::env::set_var("VIDROUTE_PORT", "8080");

        config.apply_env_overrides().unwrap();
        assert_eq!(config.execution.node_api_url, "http://execution.internal:3000");
        assert_eq!(config.execution.api_key, "prod-key");
        assert_eq!(config.server.port, 8080);

        std::env::remove_var("NODE_API_URL");
        std::env::remove_var("API_KEY");
        std::env::remove_var("VIDROUTE_PORT");
    }
}
