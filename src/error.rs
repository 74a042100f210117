//! Error types for the Blip client
//!
//! Three layers, from the wire up:
//! - [`ClientError`]: what the HTTP client saw (timeout, status, decode)
//! - [`ServiceError`]: what a service function reports. Only a static
//!   per-endpoint message survives; the underlying error is logged.
//! - [`QueryError`]: what a cached query surfaces to views

use thiserror::Error;

/// Transport-level errors raised by [`crate::api::ApiClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection or I/O failure
    #[error("network error: {0}")]
    Network(String),

    /// 401 that survived the refresh-and-retry sequence
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-success status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Request could not be built (bad URL, unserializable body)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

/// Error returned by every service function.
///
/// Carries a fixed message per endpoint, e.g. "Failed to fetch transaction volume".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    message: &'static str,
}

impl ServiceError {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// Error surfaced by the query layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Response parsed but had the wrong shape (e.g. list without `results` array)
    #[error("Unexpected response format")]
    UnexpectedFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_displays_only_static_message() {
        let err = ServiceError::new("Failed to fetch top users");
        assert_eq!(err.to_string(), "Failed to fetch top users");

        let query: QueryError = err.into();
        assert_eq!(query.to_string(), "Failed to fetch top users");
    }

    #[test]
    fn unexpected_format_message() {
        assert_eq!(
            QueryError::UnexpectedFormat.to_string(),
            "Unexpected response format"
        );
    }
}
