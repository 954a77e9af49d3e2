//! Registry error types.

use thiserror::Error;

use super::ports::BindError;
use crate::domains::descriptor::DescriptorError;

/// Errors from registering or removing routes and tools.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A route or tool with this name is already registered.
    #[error("'{0}' is already registered")]
    DuplicateName(String),

    /// No route with this name is registered.
    #[error("'{0}' is not registered")]
    NotFound(String),

    /// The endpoint cannot be served as a proxy route.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The tool descriptor could not be parsed.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// A serving surface refused the new entry.
    #[error("Binding failed: {0}")]
    Bind(#[from] BindError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
