//! Error types for friday-ai

use thiserror::Error;

/// Result type alias using friday-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing a reply
#[derive(Error, Debug)]
pub enum Error {
    /// No backend is available to answer yet
    #[error("AI backend is not initialized")]
    Unavailable,

    /// The language model failed to produce a reply
    #[error("Model error: {0}")]
    Model(String),
}

impl Error {
    /// Create a model error from anything printable
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Whether the caller should tell the user to come back later
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::Unavailable)
    }
}
