//! User identities.
//!
//! An identity is the only thing a user shares with a peer to start a
//! conversation. Fresh identities are 128 random bits rendered as 32 lowercase
//! hex characters. Identities typed or pasted by a user are only checked for a
//! minimum length: this guards against typos, not forgery.

use std::fmt;

use ciphernet_crypto::{IDENTITY_BYTES, encode_identity};
use serde::{Deserialize, Serialize};

use crate::{
    env::Environment,
    error::{ContactError, EntropyError},
};

/// Minimum length, after trimming, of a user-supplied peer identity
pub const MIN_PEER_IDENTITY_LEN: usize = 8;

/// A user identity.
///
/// Compared byte-wise. Deserialization does not validate, so identities that
/// were stored by older clients load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an identity string as-is.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh identity from the environment's secure random source.
    ///
    /// # Errors
    ///
    /// `EntropyError` if the random source fails. No identity is produced.
    pub fn generate<E: Environment>(env: &E) -> Result<Self, EntropyError> {
        let bytes: [u8; IDENTITY_BYTES] = env.random_array()?;
        Ok(Self(encode_identity(&bytes)))
    }

    /// Parse an identity supplied by a user (pasted, typed).
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// `IdentityTooShort` if fewer than [`MIN_PEER_IDENTITY_LEN`] characters
    /// remain.
    pub fn parse_peer(raw: &str) -> Result<Self, ContactError> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len < MIN_PEER_IDENTITY_LEN {
            return Err(ContactError::IdentityTooShort { len, min: MIN_PEER_IDENTITY_LEN });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Identity text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The local user's account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdentity {
    /// Display name chosen by the user
    pub username: String,
    /// Identity shared with peers
    pub id: Identity,
}

impl LocalIdentity {
    /// Create an account record.
    pub fn new(username: impl Into<String>, id: Identity) -> Self {
        Self { username: username.into(), id }
    }
}
