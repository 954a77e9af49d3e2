//! Outbound HTTP requests.
//!
//! Tools and proxy routes describe a request; this module performs it and
//! normalizes the answer into status + data.

mod client;
mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    BasicAuth, HttpExecutor, MultipartField, OutboundBody, OutboundExecutor, OutboundRequest,
    OutboundResponse,
};
pub use error::OutboundError;
pub use http::Method;
