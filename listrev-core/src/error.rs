//! Error types for listrev
//!
//! This module defines the error type returned by queue, thread and module
//! operations across the listrev crates.

use thiserror::Error;

/// Errors that can occur in listrev
#[derive(Debug, Error)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    IO(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No queue was registered under the given name
    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    /// A queue with the given name already exists
    #[error("Queue already exists: {0}")]
    QueueAlreadyExists(String),

    /// The queue exists but carries a different element type
    #[error("Queue {0} does not carry the requested element type")]
    QueueTypeMismatch(String),

    /// Worker thread was started twice
    #[error("Worker thread of {0} is already running")]
    ThreadAlreadyRunning(String),

    /// Worker thread was stopped while not running
    #[error("Worker thread of {0} is not running")]
    ThreadNotRunning(String),

    /// Worker thread could not be spawned or joined
    #[error("Thread error: {0}")]
    Thread(String),

    /// Command string not understood by a module
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// No module factory registered for a plugin name
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    /// Command arrived in a state that does not allow it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Actor errors
    #[error("Actor error: {0}")]
    Actor(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for listrev operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Serialization(error.to_string())
    }
}
