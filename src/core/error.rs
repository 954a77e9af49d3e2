//! Error types and handling for the gateway.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and external dependencies.

use thiserror::Error;

/// A specialized Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the registry domain.
    #[error("Registry error: {0}")]
    Registry(#[from] crate::domains::registry::RegistryError),

    /// Error originating from descriptor parsing.
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] crate::domains::descriptor::DescriptorError),

    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// Error performing an outbound request.
    #[error("Outbound error: {0}")]
    Outbound(#[from] super::outbound::OutboundError),

    /// Error from a transport.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal errors that should not occur under normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
