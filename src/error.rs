//! Error types for ChromoDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ChromoError
pub type Result<T> = std::result::Result<T, ChromoError>;

/// Unified error type for ChromoDB operations
#[derive(Debug, Error)]
pub enum ChromoError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record / Log Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No bytes at all at a record boundary (clean end of log)
    #[error("End of file")]
    EndOfFile,

    /// Fewer bytes available than a header declared
    #[error("Truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: u64, found: u64 },

    #[error("Corrupt record at offset {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    #[error("key not found")]
    KeyNotFound,

    #[error("engine is closed")]
    EngineClosed,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("bad sequence: {0}")]
    MalformedCommand(String),

    #[error("nonexistent command: {0}")]
    UnknownCommand(String),

    #[error("Invalid authentication")]
    AuthFailed,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("TLS error: {0}")]
    Tls(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Resource Errors
    // -------------------------------------------------------------------------
    #[error("Memory usage {usage} bytes exceeds limit of {limit} bytes")]
    MemoryLimitExceeded { usage: u64, limit: u64 },
}

impl From<rustls::Error> for ChromoError {
    fn from(err: rustls::Error) -> Self {
        ChromoError::Tls(err.to_string())
    }
}
