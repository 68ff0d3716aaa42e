use thiserror::Error as ThisError;

/// Errors raised by an object store client once its own retries are spent
#[derive(Debug, Clone, ThisError)]
pub enum StorageError {
    /// Network or throttling failure that outlived the client's retry policy
    #[error("Transport error during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// Bucket or key does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Credentials lack permission for the operation
    #[error("Access denied for '{operation}' on {resource}")]
    AccessDenied { operation: String, resource: String },

    /// Local file involved in a transfer could not be read or written
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    /// Any other non-retryable API error
    #[error("Storage backend error: {message}")]
    Backend { message: String },
}

impl StorageError {
    pub fn transport(operation: &str, message: impl Into<String>) -> Self {
        StorageError::Transport {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend {
            message: message.into(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
