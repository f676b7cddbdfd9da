//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Lifecycle protocol violations of the samples engine.
///
/// These are fatal to the current session: the caller must `reset()` before
/// starting over.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("Samples engine was not reset")]
    NotReset,

    #[error("Samples engine is not initialized")]
    NotInitialized,

    #[error("Samples engine is not finalized")]
    NotFinalized,
}

/// Errors that can occur during trace parsing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("Unknown trace event phase: {0:?}")]
    UnknownPhase(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Failed to read trace file: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
