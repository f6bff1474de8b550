//! Client error types.

use std::io;

use thiserror::Error;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum StatsdError {
    /// The client was closed; nothing was sent.
    #[error("statsd client is closed")]
    Closed,

    /// Writing to or closing the transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The background flush thread could not be spawned.
    #[error("failed to start flush timer: {0}")]
    Timer(#[source] io::Error),
}

impl StatsdError {
    /// Whether this error came from calling into a closed client.
    pub fn is_closed(&self) -> bool {
        matches!(self, StatsdError::Closed)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StatsdError>;
