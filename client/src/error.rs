//! Error types for the request path.

use thiserror::Error;

/// Failure of one logical request, after any retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The overall deadline elapsed; the in-flight call was dropped.
    #[error("request timed out")]
    Timeout,
    /// Non-success status that is not retried.
    #[error("HTTP error: {status}")]
    HttpError {
        /// Response status code.
        status: u16,
    },
    /// Transport-level failure that retrying cannot fix.
    #[error("network error: {0}")]
    NetworkFailure(String),
    /// The caller's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,
    /// Every attempt hit a retryable failure.
    #[error("giving up after {attempts} attempts: {last_failure}")]
    MaxRetriesExceeded {
        /// Attempts made.
        attempts: u32,
        /// What went wrong on the final attempt.
        last_failure: String,
    },
    /// The response body did not match the expected shape.
    #[error("parse error: {0}")]
    Decode(String),
    /// The request body could not be serialized; nothing was sent.
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl RequestError {
    /// Status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError {
                status,
            } => Some(*status),
            _ => None,
        }
    }
}

/// What the transport seam can report besides a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, reset, DNS, TLS and the like. Retryable.
    #[error("{0}")]
    Network(String),
    /// The request could not be built (bad URL, bad header). Not retryable.
    #[error("invalid request: {0}")]
    Invalid(String),
    /// The call was aborted before completing.
    #[error("aborted")]
    Cancelled,
}
