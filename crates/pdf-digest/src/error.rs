//! Error types for the digest pipeline

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Insert,
    Update,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOperation::Insert => write!(f, "insert"),
            StoreOperation::Update => write!(f, "update"),
        }
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text could not be extracted from a file
    #[error("Failed to extract text from '{path}': {message}")]
    Extraction { path: String, message: String },

    /// Insert or update against the document store failed
    #[error("Document store {operation} failed: {message}")]
    StoreWrite {
        operation: StoreOperation,
        message: String,
    },

    /// Document not found in the store
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an extraction error for a path
    pub fn extraction(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a store write error
    pub fn store_write(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            operation,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error aborts the whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Whether this error happened while talking to the document store
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::StoreWrite { .. } | Error::DocumentNotFound(_) | Error::Database(_)
        )
    }
}
