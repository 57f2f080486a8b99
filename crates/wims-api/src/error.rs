//! Transport and protocol error types.

use thiserror::Error;

/// What an absence answer says is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Missing {
    /// No class was ever created under the route.
    Route,
    /// The addressed class itself.
    Class,
    /// A member of an existing class.
    Item,
}

/// Errors that can occur when talking to a WIMS server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The server returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The response body is not a well-formed adm/raw answer.
    #[error("parse error: {0}")]
    Parse(String),

    /// The server reported that the addressed record does not exist.
    #[error("{job}: {message}")]
    NotFound {
        job: String,
        missing: Missing,
        message: String,
    },

    /// The server refused the request for any other reason.
    #[error("{job} refused: {message}")]
    Remote { job: String, message: String },
}

impl ApiError {
    /// Whether the server reported the addressed record as absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// What the server reported as absent, if anything.
    #[must_use]
    pub const fn missing(&self) -> Option<Missing> {
        match self {
            Self::NotFound { missing, .. } => Some(*missing),
            _ => None,
        }
    }

    pub(crate) fn not_found(
        job: impl Into<String>,
        missing: Missing,
        message: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            job: job.into(),
            missing,
            message: message.into(),
        }
    }

    pub(crate) fn remote(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            job: job.into(),
            message: message.into(),
        }
    }
}
