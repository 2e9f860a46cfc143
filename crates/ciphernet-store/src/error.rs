//! Storage error types.

use thiserror::Error;

/// Errors raised by a [`crate::KeyValueStore`] or the session layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend could not read or write (database, filesystem, lock)
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A record could not be encoded for writing
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failure injected by [`crate::ChaoticStore`]
    #[error("injected failure during {operation}")]
    Injected {
        /// Operation that was failed
        operation: &'static str,
    },
}

impl StorageError {
    /// Returns true if the failure came from fault injection.
    pub fn is_injected(&self) -> bool {
        matches!(self, Self::Injected { .. })
    }
}
