//! Error types for vq-core.

use thiserror::Error;

/// Result type alias using vq-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for coach agent operations
#[derive(Error, Debug)]
pub enum Error {
    // Generative provider errors
    #[error("Generation request failed ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Generation response contained no candidate text")]
    EmptyResponse(String),

    #[error("Embedding response contained no values")]
    EmptyEmbedding,

    // Memory store errors
    #[error("Memory store request failed ({status}): {body}")]
    Store { status: u16, body: String },

    // Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a non-success provider response
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Create an error from a non-success fact-store response
    pub fn store(status: u16, body: impl Into<String>) -> Self {
        Self::Store {
            status,
            body: body.into(),
        }
    }
}
