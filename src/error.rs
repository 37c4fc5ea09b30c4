//! Error types for scopedkv
//!
//! Provides a unified error type for all operations.
//!
//! Absence of a key is never an error; the typed accessors model it with
//! `Option` and fallback values instead.

use thiserror::Error;

/// Result type alias using StorageError
pub type Result<T> = std::result::Result<T, StorageError>;

/// Unified error type for scopedkv operations
#[derive(Debug, Error)]
pub enum StorageError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Key / Workspace Errors
    // -------------------------------------------------------------------------
    #[error("Key is reserved for storage metadata: {0}")]
    ReservedKey(String),

    #[error("Invalid workspace identity: {0}")]
    InvalidWorkspace(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
