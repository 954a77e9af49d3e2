//! Transport layer for the gateway.
//!
//! - **HTTP** (always on): registration API, proxy routes and MCP as
//!   JSON-RPC over POST
//! - **TCP** (feature `tcp`, enabled when `MCP_TCP_PORT` is set): MCP over a
//!   raw socket via rmcp
//!
//! Proxy routes are served from the [`RouteTable`], which the registry binds
//! into at runtime.

mod api;
mod config;
mod error;
mod route_table;
mod service;

pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

pub use config::{HttpConfig, TransportConfig};
pub use error::{TransportError, TransportResult};
pub use route_table::{Dispatch, RouteTable};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;
