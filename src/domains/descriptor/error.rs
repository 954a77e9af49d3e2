//! Descriptor parsing error types.

use thiserror::Error;

/// Errors that can occur while parsing a request descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor could not be tokenized or a flag could not be applied.
    #[error("Malformed descriptor: {0}")]
    Malformed(String),

    /// A `@path` form value could not be opened or is not allowed.
    #[error("Cannot attach file '{path}': {reason}")]
    Attachment { path: String, reason: String },
}

impl DescriptorError {
    /// Create a new "malformed" error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a "malformed" error for a flag given without its value.
    pub fn missing_value(flag: &str) -> Self {
        Self::Malformed(format!("missing value for {flag}"))
    }

    /// Create a new "attachment" error.
    pub fn attachment(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Attachment {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
