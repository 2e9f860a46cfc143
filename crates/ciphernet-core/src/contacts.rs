//! Contact directory.
//!
//! Maps display names to peer identities. Identities are unique in the
//! directory; admission trims and length-checks the identity and refuses
//! blank names. Names are stored as typed.

use serde::{Deserialize, Serialize};

use crate::{error::ContactError, identity::Identity};

/// A known peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name, not unique
    #[serde(rename = "username")]
    pub name: String,
    /// Peer identity, unique within a directory
    pub id: Identity,
}

/// Ordered set of contacts keyed by identity.
///
/// Loading a stored list keeps the first entry for each identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Contact>", into = "Vec<Contact>")]
pub struct ContactDirectory {
    contacts: Vec<Contact>,
}

impl ContactDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new contact.
    ///
    /// # Errors
    ///
    /// - `EmptyName`: `name` is blank
    /// - `IdentityTooShort`: trimmed identity under the minimum length
    /// - `DuplicateIdentity`: identity already present
    ///
    /// The directory is unchanged on error.
    pub fn add(&mut self, name: &str, raw_identity: &str) -> Result<&Contact, ContactError> {
        if name.trim().is_empty() {
            return Err(ContactError::EmptyName);
        }

        let id = Identity::parse_peer(raw_identity)?;
        if self.contains(&id) {
            return Err(ContactError::DuplicateIdentity { identity: id });
        }

        self.contacts.push(Contact { name: name.to_string(), id });
        let index = self.contacts.len() - 1;
        Ok(&self.contacts[index])
    }

    /// Contact by identity.
    pub fn get(&self, id: &Identity) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == *id)
    }

    /// True if `id` is a contact.
    pub fn contains(&self, id: &Identity) -> bool {
        self.get(id).is_some()
    }

    /// Contacts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    /// Number of contacts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True if there are no contacts.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl From<Vec<Contact>> for ContactDirectory {
    fn from(stored: Vec<Contact>) -> Self {
        let mut contacts: Vec<Contact> = Vec::with_capacity(stored.len());
        for contact in stored {
            if contacts.iter().any(|existing| existing.id == contact.id) {
                tracing::warn!(id = %contact.id, "dropping duplicate stored contact");
                continue;
            }
            contacts.push(contact);
        }
        Self { contacts }
    }
}

impl From<ContactDirectory> for Vec<Contact> {
    fn from(directory: ContactDirectory) -> Self {
        directory.contacts
    }
}
