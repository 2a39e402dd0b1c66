//! Failures reported by remote collaborators.
//!
//! Geocoding, directions, imagery and lamp detection all sit behind HTTP
//! services in production. Adapters translate their transport failures into
//! [`ServiceError`] so the core can log or surface them without knowing the
//! client library involved.

use thiserror::Error;

/// Transport or protocol failure from a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL with credentials redacted.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Request URL with credentials redacted.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Diagnostic from the HTTP client.
        message: String,
    },
    /// The request failed before a response was received.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// Request URL with credentials redacted.
        url: String,
        /// Diagnostic from the HTTP client.
        message: String,
    },
    /// The service answered successfully at the HTTP level but reported an
    /// application error.
    #[error("service returned {status}: {message}")]
    Rejected {
        /// Service-specific status code, e.g. `"OVER_QUERY_LIMIT"`.
        status: String,
        /// Service-supplied message, empty when none was given.
        message: String,
    },
    /// The response body could not be parsed.
    #[error("failed to parse service response: {message}")]
    ParseError {
        /// Parser diagnostic.
        message: String,
    },
}
