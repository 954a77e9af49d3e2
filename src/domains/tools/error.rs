//! Tool-specific error types.

use thiserror::Error;

use crate::core::outbound::OutboundError;

/// Errors that can occur when invoking a registered tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The frozen descriptor has no usable url or method.
    #[error("Tool '{tool}' has no resolvable target: {reason}")]
    UnresolvedTarget { tool: String, reason: String },

    /// A form attachment could not be read at invocation time.
    #[error("Cannot read attachment '{path}': {reason}")]
    Attachment { path: String, reason: String },

    /// The upstream could not be reached.
    #[error(transparent)]
    Upstream(#[from] OutboundError),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "unresolved target" error.
    pub fn unresolved(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvedTarget {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
