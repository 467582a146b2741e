//! Error types for deckgen.
//!
//! Library crates use [`DeckgenError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all deckgen operations.
#[derive(Debug, thiserror::Error)]
pub enum DeckgenError {
    /// Configuration loading or validation error (including a missing API key).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while reading a source.
    #[error("network error: {0}")]
    Network(String),

    /// CSV or response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Language-model call failed or returned an unusable reply.
    #[error("model error: {0}")]
    Model(String),

    /// The presentation service was unreachable or rejected the request.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Downloading a generated artifact failed.
    #[error("download failed: {0}")]
    Download(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input data does not have the expected shape (missing columns, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Reading operator input from the terminal failed.
    #[error("input error: {0}")]
    Interaction(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DeckgenError>;

impl DeckgenError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
