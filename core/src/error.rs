//! Error types for the venues API client.
//!
//! # Design
//! Every failure a call can produce lands in one `ApiError`. Configuration
//! and validation problems are detected before any network use; the other
//! variants describe what went wrong between sending the GET and pulling the
//! requested field out of the response envelope. Nothing here is retried.

use thiserror::Error;

/// Boxed source error carried by `ApiError::Transport`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `VenuesClient` and its transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration is missing a field or holds an unusable
    /// value. Raised at construction; no client is produced.
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The request never produced a response (DNS, connection, TLS, or a
    /// broken body stream).
    #[error("error calling remote host: {0}")]
    Transport(#[source] BoxError),

    /// The response body is not JSON, or not even UTF-8 text.
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(#[source] BoxError),

    /// The envelope carried a status code other than success.
    #[error("{}: {}", display_code(.code), .detail)]
    NonSuccessStatus {
        code: Option<i64>,
        error_type: Option<String>,
        detail: String,
    },

    /// The body is JSON but has no status section. Carries a dump of the
    /// parsed document.
    #[error("response had no code: {0}")]
    MalformedEnvelope(String),
}

impl ApiError {
    pub(crate) fn transport(source: impl Into<BoxError>) -> Self {
        ApiError::Transport(source.into())
    }

    pub(crate) fn malformed_body(source: impl Into<BoxError>) -> Self {
        ApiError::MalformedBody(source.into())
    }

    /// Status code carried by a `NonSuccessStatus` error.
    pub fn status_code(&self) -> Option<i64> {
        match self {
            ApiError::NonSuccessStatus { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::malformed_body(err)
    }
}

fn display_code(code: &Option<i64>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}
