//! Session persistence.
//!
//! Three JSON records under versioned keys: the local account, the full
//! conversation log and the contact directory. A record that is missing or
//! does not parse loads as "no prior state"; backend failures propagate.

use ciphernet_core::{ContactDirectory, ConversationLog, LocalIdentity};
use serde::{Serialize, de::DeserializeOwned};

use super::{KeyValueStore, StorageError};

/// Key of the local account record
pub const ACCOUNT_KEY: &str = "ciphernet_user_v2";

/// Key of the conversation log
pub const LOG_KEY: &str = "ciphernet_messages_v2";

/// Key of the contact directory
pub const CONTACTS_KEY: &str = "ciphernet_contacts_v2";

/// Everything persisted for one local user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Cached account, if one was registered
    pub account: Option<LocalIdentity>,
    /// All envelopes, every conversation
    pub log: ConversationLog,
    /// Known peers
    pub contacts: ContactDirectory,
}

/// Typed access to the persisted session records.
#[derive(Clone)]
pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Layer session records over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying key-value store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load all three records.
    ///
    /// # Errors
    ///
    /// Backend failures only. Malformed records are logged and replaced by
    /// their empty default.
    pub fn load(&self) -> Result<Session, StorageError> {
        let session = Session {
            account: self.load_account()?,
            log: self.read(LOG_KEY)?.unwrap_or_default(),
            contacts: self.read(CONTACTS_KEY)?.unwrap_or_default(),
        };

        tracing::debug!(
            has_account = session.account.is_some(),
            messages = session.log.len(),
            contacts = session.contacts.len(),
            "loaded session"
        );
        Ok(session)
    }

    /// Load the cached account record.
    pub fn load_account(&self) -> Result<Option<LocalIdentity>, StorageError> {
        self.read(ACCOUNT_KEY)
    }

    /// Persist the account record.
    pub fn save_account(&self, account: &LocalIdentity) -> Result<(), StorageError> {
        self.write(ACCOUNT_KEY, account)
    }

    /// Persist the whole conversation log.
    pub fn save_log(&self, log: &ConversationLog) -> Result<(), StorageError> {
        self.write(LOG_KEY, log)
    }

    /// Persist the contact directory.
    pub fn save_contacts(&self, contacts: &ContactDirectory) -> Result<(), StorageError> {
        self.write(CONTACTS_KEY, contacts)
    }

    /// Delete all three records.
    pub fn wipe(&self) -> Result<(), StorageError> {
        for key in [ACCOUNT_KEY, LOG_KEY, CONTACTS_KEY] {
            self.store.remove(key)?;
        }
        tracing::info!("session wiped");
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StorageError> {
        let Some(text) = self.store.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding malformed stored record");
                Ok(None)
            },
        }
    }

    fn write<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), StorageError> {
        let text =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put(key, &text)
    }
}
