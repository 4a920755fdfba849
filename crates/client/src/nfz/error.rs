//! NFZ queue directory client error types.

use std::sync::Arc;

/// Errors from the NFZ queue directory client.
#[derive(Debug, thiserror::Error)]
pub enum NfzError {
    /// Query rejected before any request was made.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid base URL or pagination link.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Pagination did not terminate within the configured page budget.
    #[error("pagination exceeded {limit} pages")]
    TooManyPages { limit: usize },
}

impl From<reqwest::Error> for NfzError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NfzError::Timeout } else { NfzError::Network(Arc::new(err)) }
    }
}

impl From<NfzError> for nfzq_core::Error {
    fn from(err: NfzError) -> Self {
        match err {
            NfzError::InvalidQuery(msg) => nfzq_core::Error::InvalidQuery(msg),
            other => nfzq_core::Error::UpstreamFetch(other.to_string()),
        }
    }
}
