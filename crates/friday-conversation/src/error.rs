//! Error types for friday-conversation

use thiserror::Error;

/// Result type alias using friday-conversation Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, saving or extending the conversation
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the response generation layer
    #[error(transparent)]
    Ai(#[from] friday_ai::Error),

    /// Reading or writing the conversation file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The conversation file is not a valid turn array
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking store task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Whether this is the "no file yet" case, which is not worth a warning
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Whether the backend failed to produce a reply
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Error::Ai(friday_ai::Error::Model(_)))
    }

    /// Whether no backend was installed to answer
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::Ai(e) if e.is_not_ready())
    }
}
