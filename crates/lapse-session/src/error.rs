//! Error types for session store operations.

use crate::id::{IdGenerationError, SessionId};

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session never existed or has already been swept.
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// The identifier generator could not produce a usable identifier.
    #[error(transparent)]
    IdGeneration(#[from] IdGenerationError),

    /// The store was built outside a Tokio runtime, so its sweeper could not
    /// be started.
    #[error("Session store requires a Tokio runtime")]
    NoRuntime,
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
