//! Transport service - starts every configured transport.
//!
//! HTTP always runs. When a TCP port is configured, MCP is additionally
//! served over raw TCP; the service stops as soon as either transport does.

use tracing::info;

use super::http::HttpTransport;
use super::{TransportConfig, TransportResult};
use crate::core::Gateway;

#[cfg(feature = "tcp")]
use super::tcp::TcpTransport;

/// Transport service - manages the transport layer for the gateway.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    /// Create a new transport service with the given configuration.
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Log information about the configured transports.
    pub fn log_info(&self) {
        info!("Starting transports: {}", self.config.description());
    }

    /// Run the transports with the given gateway state.
    ///
    /// This method blocks until the HTTP transport shuts down or a transport
    /// fails.
    pub async fn run(self, gateway: Gateway) -> TransportResult<()> {
        self.log_info();

        let http = HttpTransport::new(self.config.http).run(gateway.clone());

        #[cfg(feature = "tcp")]
        if let Some(tcp) = self.config.tcp {
            let tcp = TcpTransport::new(tcp).run(gateway.server().clone());
            return tokio::select! {
                result = http => result,
                result = tcp => result,
            };
        }

        http.await
    }
}
