//! Error types for the pacekit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pacekit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed workout data (unknown or missing block type, bad nesting)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Input outside the domain of a computation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Workout refused on save
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Lookup that found nothing
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workout cannot be turned into a scheduling plan
    #[error("Plan error: {0}")]
    Plan(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Missing target of an edit-session or store operation.
///
/// Returned instead of panicking so callers can either surface it or
/// discard it deliberately with `let _ = ...`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    #[error("no block at index {0}")]
    BlockIndex(usize),

    #[error("no work block in session")]
    WorkBlock,

    #[error("block is not a work block")]
    NotWorkBlock,

    #[error("work block has no rest block")]
    RestBlock,

    #[error("no workout with id {0}")]
    Workout(i64),
}
