//! Unified error types for nfz-queues.

use tokio_rusqlite::rusqlite;

/// Unified error types for the nfz-queues service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Query rejected before any I/O (bad case, province, or locality rule).
    #[error("INVALID_QUERY: {0}")]
    InvalidQuery(String),

    /// Upstream queue directory request failed.
    #[error("UPSTREAM_ERROR: {0}")]
    UpstreamFetch(String),

    /// Geocoder failed to locate an address.
    #[error("GEOCODE_FAILED: {0}")]
    GeocodeFailed(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored payload could not be (de)serialized.
    #[error("CACHE_ERROR: invalid stored payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl Error {
    /// Whether the error should be reported to the caller as a bad request.
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Error::InvalidQuery(_))
    }
}
