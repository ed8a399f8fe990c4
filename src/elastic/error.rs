//! Error types returned by the [`Store`](crate::elastic::store::Store) and the
//! [`Dispatcher`](crate::elastic::dispatcher::Dispatcher).

use std::time::Duration;

use thiserror::Error;

use crate::limiter::Interrupted;

/// Failure of a call to the search engine.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(String),

    #[error("failed to send request to Elasticsearch")]
    Transport(#[source] reqwest::Error),

    #[error("Elasticsearch returned status {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("not found: {reason}")]
    NotFound { reason: String },

    #[error("failed to decode Elasticsearch response")]
    Decode(#[source] reqwest::Error),

    #[error("request did not complete after {0:?}")]
    Timeout(Duration),
}

/// Outcome of a [`Dispatcher`](crate::elastic::dispatcher::Dispatcher) operation that
/// did not succeed.
///
/// Lets callers tell apart requests that were skipped from requests that failed remotely.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The document or the index target failed validation; nothing was sent.
    #[error("invalid document or index target")]
    Invalid,

    /// Waiting for a permit was aborted; nothing was sent.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    /// The index does not exist.
    #[error("index {0} not found")]
    NotFound(String),

    /// The request body could not be built.
    #[error("failed to serialize request")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
