//! Core module containing shared infrastructure components.
//!
//! Configuration, error handling, outbound HTTP, attachment path security,
//! the MCP server handler and the transports.

pub mod config;
pub mod error;
pub mod gateway;
pub mod outbound;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use security::{PathSecurityError, validate_attachment_path};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
