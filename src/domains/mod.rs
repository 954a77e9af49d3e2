//! Domains module containing business logic organized by bounded contexts.
//!
//! - `descriptor` - curl-style request strings to structured requests
//! - `routes` - proxy routes and call forwarding
//! - `tools` - tools built from descriptors and exposed over MCP
//! - `registry` - runtime registration of routes and tools

pub mod descriptor;
pub mod registry;
pub mod routes;
pub mod tools;
