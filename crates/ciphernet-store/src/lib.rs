//! Storage abstraction for CipherNet sessions
//!
//! Trait-based abstraction over a durable string key-value store. The trait is
//! synchronous; every backend completes its work before returning.
//!
//! [`SessionStore`] layers the three persisted records (account, conversation
//! log, contact directory) on top of any [`KeyValueStore`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
mod error;
mod memory;
mod redb;
mod session;

pub use chaotic::ChaoticStore;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use session::{ACCOUNT_KEY, CONTACTS_KEY, LOG_KEY, Session, SessionStore};

pub use self::redb::RedbStore;

/// Durable string key-value store.
///
/// Must be Clone (the runtime and the session layer share it), Send + Sync,
/// and synchronous. Implementations share internal state via Arc, so clones
/// access the same underlying data.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    /// Value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Invariants
    ///
    /// - Post: a subsequent `get(key)` returns `value`
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
