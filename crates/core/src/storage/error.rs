//! Storage error types.

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The selected backend cannot be built. Fatal at startup.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Persisting an object failed.
    #[error("failed to write '{key}': {source}")]
    Write {
        /// Storage key being written.
        key: String,
        /// Underlying backend error.
        #[source]
        source: opendal::Error,
    },

    /// Key is empty or would escape its namespace.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a write error.
    #[must_use]
    pub fn write(key: impl Into<String>, source: opendal::Error) -> Self {
        Self::Write {
            key: key.into(),
            source,
        }
    }

    /// Create an invalid key error.
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Whether this error should abort startup.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
