//! Dynamic registry domain.
//!
//! Single source of truth for which proxy routes and tools exist. The
//! registry owns no sockets; it drives a [`RouteBinder`] and a
//! [`ToolSurface`] supplied by the transport layer.

mod error;
mod ports;
mod service;

pub use error::RegistryError;
pub use ports::{BindError, RouteBinder, ToolSurface};
pub use service::{DynamicRegistry, GATEWAY_PATHS, PROXY_METHODS, ToolListing};
