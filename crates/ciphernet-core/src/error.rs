//! Error types for the CipherNet core.
//!
//! Strongly-typed errors for each failure class: fatal entropy failures,
//! user-input rejections at the contact boundary, log invariant violations
//! and advisory service outages.
//!
//! Decryption failure is deliberately absent. It is an expected per-message
//! outcome and is modelled as [`crate::Decryption::Failed`].

use thiserror::Error;

use crate::identity::Identity;

/// The secure random source could not produce bytes.
///
/// Fatal: identity generation and nonce creation abort. No retry is
/// meaningful.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// OS or simulated RNG failed
    #[error("secure random source unavailable: {reason}")]
    Unavailable {
        /// Underlying RNG error
        reason: String,
    },
}

/// Contact admission rejected. No state was changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// Display name missing or blank
    #[error("contact name is empty")]
    EmptyName,

    /// Identity shorter than the minimum after trimming
    #[error("invalid identity length: {len} characters, minimum is {min}")]
    IdentityTooShort {
        /// Length of the trimmed identity
        len: usize,
        /// Required minimum
        min: usize,
    },

    /// Identity already present in the directory
    #[error("identity {identity} is already a contact")]
    DuplicateIdentity {
        /// The existing identity
        identity: Identity,
    },
}

impl ContactError {
    /// Returns true for duplicates, which callers may treat as a no-op.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateIdentity { .. })
    }
}

/// Conversation log invariant violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// Envelope id already present in the log
    #[error("message id {id} already in log")]
    DuplicateMessageId {
        /// Conflicting id
        id: String,
    },
}

/// Advisory text service failure.
///
/// Never security relevant. Callers substitute a default tip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryError {
    /// No service is configured (e.g. missing API key)
    #[error("advisory service not configured")]
    NotConfigured,

    /// Service configured but the request failed
    #[error("advisory service unavailable: {reason}")]
    Unavailable {
        /// Failure description
        reason: String,
    },
}
