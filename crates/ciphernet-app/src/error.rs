//! Runtime error types.

use ciphernet_core::EntropyError;
use ciphernet_store::StorageError;
use thiserror::Error;

/// Errors that stop the runtime from executing an action.
///
/// Decryption failures never appear here; they are per-message outcomes
/// held in the view.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Persisting or loading session records failed.
    ///
    /// In-memory state is ahead of storage; the next successful save
    /// catches up.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The secure random source failed. No identity or message was produced.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// A blocking crypto task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),

    /// The driver failed to render.
    #[error("render failed: {0}")]
    Driver(Box<dyn std::error::Error + Send + Sync>),
}

impl RuntimeError {
    /// Returns true if retrying cannot help.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Entropy(_) | Self::Task(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_is_fatal_storage_is_not() {
        let entropy = RuntimeError::from(EntropyError::Unavailable { reason: "gone".to_string() });
        let storage = RuntimeError::from(StorageError::Io("disk full".to_string()));

        assert!(entropy.is_fatal());
        assert!(!storage.is_fatal());
        assert_eq!(storage.to_string(), "storage I/O error: disk full");
    }
}
