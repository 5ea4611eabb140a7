//! Error types for polyvox.

use thiserror::Error;

/// Result type alias for polyvox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the audio thread.
///
/// Out-of-range parameter values are not errors: writes clamp.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Empty MIDI message")]
    EmptyMessage,

    #[error("Malformed MIDI message: status {status:#04x} needs {expected} bytes, got {actual}")]
    MalformedMessage {
        status: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Parameter already exists: {0}")]
    DuplicateParameter(String),

    #[error("Invalid range for '{name}': min={min}, max={max}")]
    InvalidRange { name: String, min: f64, max: f64 },

    #[error("Voice pool exhausted")]
    PoolExhausted,

    #[error("Command queue full")]
    QueueFull,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
