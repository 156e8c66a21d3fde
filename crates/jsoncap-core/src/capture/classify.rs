//! Body fetch errors and how the coordinator treats them.

use thiserror::Error;

/// Protocol error code the debugging protocol uses for "no such resource".
pub const NO_RESOURCE_CODE: i64 = -32000;

/// Message the debugging protocol attaches to that error.
pub const NO_RESOURCE_MESSAGE: &str = "No resource with given identifier found";

/// Error returned by a [`BodySource`](super::BodySource).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The observer has no body for this request (redirect, cache hit, preflight).
    #[error("no resource with given identifier found")]
    NotFound,
    /// Error reply from the observer's protocol.
    #[error("protocol error {code}: {message}")]
    Protocol { code: i64, message: String },
    /// The observer could not be reached at all.
    #[error("body source unavailable: {0}")]
    Transport(String),
}

/// How a failed fetch ends the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    /// Expected terminal state; dropped quietly.
    Unavailable,
    /// Unexpected; logged, then dropped.
    Other,
}

pub fn classify_fetch_error(e: &FetchError) -> FetchFailureKind {
    match e {
        FetchError::NotFound => FetchFailureKind::Unavailable,
        FetchError::Protocol { code, message }
            if *code == NO_RESOURCE_CODE || message.contains(NO_RESOURCE_MESSAGE) =>
        {
            FetchFailureKind::Unavailable
        }
        FetchError::Protocol { .. } | FetchError::Transport(_) => FetchFailureKind::Other,
    }
}
