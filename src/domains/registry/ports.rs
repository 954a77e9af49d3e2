//! Seams between the registry and the live serving surfaces.

use http::Method;
use std::sync::Arc;
use thiserror::Error;

use crate::domains::routes::ProxyHandler;
use crate::domains::tools::HttpTool;

/// A serving surface refused a binding.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BindError(String);

impl BindError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Live HTTP routing table that proxy routes are attached to.
pub trait RouteBinder: Send + Sync {
    /// Serve `path` for `methods` through `handler` from now on.
    fn bind(
        &self,
        path: &str,
        methods: &[Method],
        handler: Arc<ProxyHandler>,
    ) -> Result<(), BindError>;

    /// Stop serving the first binding whose path equals `path`.
    ///
    /// Returns whether a binding was removed.
    fn unbind(&self, path: &str) -> bool;
}

/// Protocol-side tool list that registered tools are exposed on.
pub trait ToolSurface: Send + Sync {
    /// Make `tool` listable and callable by protocol clients.
    fn expose(&self, tool: Arc<HttpTool>) -> Result<(), BindError>;
}
