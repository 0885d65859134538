//! Error types for setu-fetch
//!
//! Two layers:
//! - [`Error`] covers a whole request attempt or the run itself. How the fetch loop reacts
//!   to each variant is decided in [`crate::retry`].
//! - [`RecordError`] covers one item of a batch. It never leaves the batch loop.

use thiserror::Error;

/// Result type alias for setu-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for setu-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with a non-success status
    #[error("API returned status code {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The response body is not the expected `{"data": [...]}` document
    #[error("failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The host could not be reached
    #[error("connection error: {0}")]
    Connect(#[source] reqwest::Error),

    /// Any other transport failure (timeout, broken body, redirect loop, ...)
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while writing an artifact or the index
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "retry.max_attempts")
        key: Option<String>,
    },
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            Error::Connect(e)
        } else {
            Error::Network(e)
        }
    }
}

/// Why a single record of a batch was skipped
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The item is not a JSON object
    #[error("record is not a JSON object")]
    NotAnObject,

    /// `pid` is absent or null
    #[error("record has no pid")]
    MissingPid,

    /// `urls.regular` is absent or not a string
    #[error("record {pid} has no urls.regular")]
    MissingUrl {
        /// The record's pid, as it would appear in the file name
        pid: String,
    },
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_includes_status_and_body() {
        let err = Error::Api {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "API returned status code 503: busy");
    }

    #[test]
    fn test_record_error_messages() {
        assert_eq!(RecordError::MissingPid.to_string(), "record has no pid");
        assert_eq!(
            RecordError::MissingUrl {
                pid: "123".to_string()
            }
            .to_string(),
            "record 123 has no urls.regular"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
