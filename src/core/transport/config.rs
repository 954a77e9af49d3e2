//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// Transport configuration options.
///
/// The HTTP gateway always runs. The MCP-over-TCP listener is started next to
/// it only when configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportConfig {
    /// HTTP gateway (registration API, proxy routes, JSON-RPC MCP endpoint).
    pub http: HttpConfig,

    /// Optional MCP sessions over raw TCP.
    #[cfg(feature = "tcp")]
    #[serde(default)]
    pub tcp: Option<TcpConfig>,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for the JSON-RPC MCP endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

/// TCP transport configuration.
#[cfg(feature = "tcp")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_path() -> String {
    "/mcp".to_string()
}

fn default_cors() -> bool {
    true
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// Create an HTTP-only transport config.
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self {
            http: HttpConfig {
                port,
                host: host.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load transport config from environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("MCP_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);
        let host = std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host());
        let rpc_path = std::env::var("MCP_HTTP_PATH").unwrap_or_else(|_| default_rpc_path());
        let enable_cors = std::env::var("MCP_HTTP_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Self {
            http: HttpConfig {
                port,
                host,
                rpc_path,
                enable_cors,
            },
            #[cfg(feature = "tcp")]
            tcp: std::env::var("MCP_TCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .map(|port| TcpConfig {
                    port,
                    host: std::env::var("MCP_TCP_HOST").unwrap_or_else(|_| default_host()),
                }),
        }
    }

    /// Get a description of the configured transports for logging.
    pub fn description(&self) -> String {
        let http = format!(
            "HTTP on {}:{} (MCP at {})",
            self.http.host, self.http.port, self.http.rpc_path
        );

        #[cfg(feature = "tcp")]
        if let Some(tcp) = &self.tcp {
            return format!("{http}, MCP over TCP on {}:{}", tcp.host, tcp.port);
        }

        http
    }
}
