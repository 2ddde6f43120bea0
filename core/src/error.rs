//! Error taxonomy for the poster API client.
//!
//! # Design
//! The set is closed. `EndpointNotFound` is the only variant the resolver
//! handles itself (it moves on to the next candidate path); every other
//! variant ends the call and reaches the caller unchanged. All transport
//! faults (DNS, refused connection, TLS, timeout) collapse into
//! `NetworkUnavailable`.

use thiserror::Error;

/// Errors returned by every client operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The base URL joined with a candidate path is not an absolute
    /// http(s) URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server returned 404 for the last candidate path tried.
    #[error("endpoint not found: {url}")]
    EndpointNotFound { url: String },

    /// The server returned a non-2xx status other than 404. `message` is the
    /// body's `error` field when present, otherwise `HTTP <status>`.
    #[error("{message}")]
    ServerError { status: u16, message: String },

    /// A JSON body did not match the expected schema.
    #[error("could not decode response: {0}")]
    DecodingError(String),

    /// The request never produced an HTTP response.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl ApiError {
    /// Whether this error stops endpoint resolution.
    pub fn is_definitive(&self) -> bool {
        !matches!(self, ApiError::EndpointNotFound { .. })
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::EndpointNotFound { .. } => Some(404),
            ApiError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::DecodingError(err.to_string())
    }
}
