//! Proxy routes domain.
//!
//! A proxy route forwards every call on a local path to a fixed upstream URL,
//! adding the route's headers, credentials and default query/body.
//!
//! - `model.rs` - route definitions as submitted and as accepted
//! - `proxy.rs` - [`ProxyHandler`] doing the forwarding

mod model;
mod proxy;

pub use model::{AddRouteRequest, RegisteredRoute, RouteAuth};
pub use proxy::{IncomingCall, ProxyHandler, ProxyResponse};
