//! Message envelopes.
//!
//! The envelope is the unit of storage and exchange. It carries routing
//! metadata in the clear and the body only as ciphertext. Wire form is a JSON
//! object with camelCase keys:
//!
//! ```text
//! {"id":"…","senderId":"…","receiverId":"…","ciphertext":"<b64>","nonce":"<b64>","timestamp":1700000000000}
//! ```
//!
//! Older records that name the body fields `encryptedContent` and `iv` are
//! accepted on input.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Characters of ciphertext shown when a message cannot be read
pub const CIPHERTEXT_PREVIEW_CHARS: usize = 100;

/// An encrypted message plus routing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    /// Unique message id (UUID v4)
    pub id: String,
    /// Author
    pub sender_id: Identity,
    /// Intended recipient
    pub receiver_id: Identity,
    /// Base64 AES-GCM ciphertext including tag
    #[serde(alias = "encryptedContent")]
    pub ciphertext: String,
    /// Base64 12-byte nonce
    #[serde(alias = "iv")]
    pub nonce: String,
    /// Milliseconds since the Unix epoch, informational only
    pub timestamp: u64,
}

impl MessageEnvelope {
    /// True if the envelope travels between `a` and `b` in either direction.
    pub fn is_between(&self, a: &Identity, b: &Identity) -> bool {
        (self.sender_id == *a && self.receiver_id == *b)
            || (self.sender_id == *b && self.receiver_id == *a)
    }

    /// True if `identity` sent or received this envelope.
    pub fn involves(&self, identity: &Identity) -> bool {
        self.sender_id == *identity || self.receiver_id == *identity
    }

    /// The first hyphen-separated group of the id, for display.
    pub fn short_id(&self) -> &str {
        self.id.split('-').next().unwrap_or(&self.id)
    }

    /// Leading characters of the ciphertext, for display without a passphrase.
    pub fn ciphertext_preview(&self) -> &str {
        match self.ciphertext.char_indices().nth(CIPHERTEXT_PREVIEW_CHARS) {
            Some((end, _)) => &self.ciphertext[..end],
            None => &self.ciphertext,
        }
    }

    /// Serialize to the single-line JSON exchange form.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the JSON exchange form.
    ///
    /// # Errors
    ///
    /// Missing fields or wrong types.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
