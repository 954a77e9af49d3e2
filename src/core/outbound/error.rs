//! Outbound request error types.

use std::time::Duration;
use thiserror::Error;

/// Errors from performing an outbound request.
///
/// Both variants mean the upstream could not be reached in time; callers
/// report them the same way. There are no automatic retries.
#[derive(Debug, Error)]
pub enum OutboundError {
    /// Connection, DNS, TLS or request construction failure.
    #[error("Failed to connect to external API: {0}")]
    Unreachable(String),

    /// The call exceeded its timeout budget and was abandoned.
    #[error("External API did not respond within {0:?}")]
    Timeout(Duration),
}

impl OutboundError {
    /// Create a new "unreachable" error.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Map a reqwest failure, distinguishing timeouts.
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Unreachable(error.without_url().to_string())
        }
    }
}
