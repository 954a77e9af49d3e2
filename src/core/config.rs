//! Configuration management for the gateway.
//!
//! This module provides a centralized configuration structure populated from
//! defaults, an optional `.env` file and `MCP_*` environment variables.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Default budget for a single outbound request.
pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Outbound HTTP client configuration.
    pub outbound: OutboundConfig,

    /// Request descriptor parsing configuration.
    pub descriptor: DescriptorConfig,

    /// Attachment path validation configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to MCP clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Outbound request configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundConfig {
    /// Timeout applied to every outbound call unless a route overrides it.
    pub timeout_secs: u64,
}

impl OutboundConfig {
    /// The default timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Request descriptor parsing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// Reject descriptor tokens outside the recognized flag set.
    pub strict: bool,
}

/// Configuration for attachment path validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Optional root directory that `@path` form attachments must live under.
    /// If None, any readable file may be attached.
    pub root_path: Option<PathBuf>,

    /// Whether symlinked attachments are followed.
    pub allow_symlinks: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            root_path: None,
            allow_symlinks: true,
        }
    }
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_OUTBOUND_TIMEOUT_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "MCP Cloud Tools".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            outbound: OutboundConfig::default(),
            descriptor: DescriptorConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Ok(raw) = std::env::var("MCP_OUTBOUND_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => config.outbound.timeout_secs = secs,
                Err(_) => warn!(
                    "Ignoring invalid MCP_OUTBOUND_TIMEOUT_SECS={:?}, using {}s",
                    raw, DEFAULT_OUTBOUND_TIMEOUT_SECS
                ),
            }
        }

        if let Ok(strict) = std::env::var("MCP_DESCRIPTOR_STRICT") {
            config.descriptor.strict = parse_flag(&strict);
        }

        if let Ok(root_path) = std::env::var("MCP_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
            info!(
                "Attachment security enabled: root directory set to {:?}",
                config.security.root_path
            );
        } else {
            warn!(
                "MCP_ROOT_PATH not set - form attachments (@path) may read any file \
                 the gateway process can open."
            );
        }

        if let Ok(allow_symlinks) = std::env::var("MCP_ALLOW_SYMLINKS") {
            config.security.allow_symlinks = allow_symlinks.parse().unwrap_or(true);
            info!("Symlinks allowed: {}", config.security.allow_symlinks);
        }

        config
    }

    /// Reject settings the gateway cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.outbound.timeout_secs == 0 {
            return Err(Error::config("outbound timeout must be at least one second"));
        }
        if !self.transport.http.rpc_path.starts_with('/') {
            return Err(Error::config(format!(
                "MCP_HTTP_PATH must start with '/', got {:?}",
                self.transport.http.rpc_path
            )));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_timeout_is_ten_seconds() {
        let config = Config::default();
        assert_eq!(config.outbound.timeout(), Duration::from_secs(10));
        assert!(!config.descriptor.strict);
    }

    #[test]
    fn test_outbound_timeout_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_OUTBOUND_TIMEOUT_SECS", "3");
        }
        let config = Config::from_env();
        assert_eq!(config.outbound.timeout_secs, 3);
        unsafe {
            std::env::remove_var("MCP_OUTBOUND_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_OUTBOUND_TIMEOUT_SECS", "soon");
        }
        let config = Config::from_env();
        assert_eq!(config.outbound.timeout_secs, DEFAULT_OUTBOUND_TIMEOUT_SECS);
        unsafe {
            std::env::remove_var("MCP_OUTBOUND_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_strict_descriptor_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_DESCRIPTOR_STRICT", "true");
        }
        let config = Config::from_env();
        assert!(config.descriptor.strict);
        unsafe {
            std::env::remove_var("MCP_DESCRIPTOR_STRICT");
        }
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.outbound.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.transport.http.rpc_path = "mcp".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("off"));
    }
}
