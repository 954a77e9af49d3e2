//! MCP Proxy Gateway Library
//!
//! A gateway whose HTTP surface is reconfigured at runtime: clients register
//! proxy routes that forward to upstream APIs, and curl-style commands that
//! become MCP tools.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, outbound HTTP, the MCP server
//!   and the transports
//! - **domains**: business logic organized by bounded contexts
//!   - **descriptor**: curl-style strings to structured requests
//!   - **routes**: proxy routes and call forwarding
//!   - **tools**: tools built from descriptors
//!   - **registry**: runtime registration of routes and tools
//!
//! # Example
//!
//! ```rust,no_run
//! use mcp_proxy_gateway::core::{Config, Gateway, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let gateway = Gateway::new(config.clone())?;
//!     TransportService::new(config.transport).run(gateway).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, Gateway, McpServer, Result};
