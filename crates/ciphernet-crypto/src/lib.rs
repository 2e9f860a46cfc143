//! CipherNet Cryptographic Primitives
//!
//! Cryptographic building blocks for CipherNet. Pure functions with
//! deterministic outputs. Callers provide random bytes (nonces, identity
//! material) so every operation can be replayed in tests.
//!
//! # Key Lifecycle
//!
//! Two peers agree on a passphrase out of band. Each side knows its own
//! identity and the peer's, in opposite roles. Sorting the pair gives both
//! sides the same salt, so both derive the same key without a handshake.
//!
//! ```text
//! Passphrase            {my id, peer id}
//!      │                       │
//!      │                 sort + join(":")
//!      │                       │
//!      │          "CipherNet-v1:" ‖ participants
//!      │                       │
//!      ▼                       ▼
//! PBKDF2-HMAC-SHA256 (150 000 rounds) → 256-bit key
//!        │
//!        ▼
//! AES-256-GCM (fresh 12-byte nonce, no AAD) → ciphertext ‖ tag
//!        │
//!        ▼
//! base64 text for storage / transport
//! ```
//!
//! The key is re-derived for every message. It is never cached, never
//! exported, and zeroized when dropped.
//!
//! # Security
//!
//! Confidentiality and integrity:
//! - AES-256-GCM authenticates every ciphertext; a wrong key, a flipped bit or
//!   a substituted nonce all fail the tag check
//! - Failed tag check -> no plaintext is released
//!
//! Pair binding:
//! - The participant pair is part of the PBKDF2 salt; the same passphrase used
//!   with a different peer yields an unrelated key
//!
//! Not provided:
//! - Forward secrecy: the key is static for a (passphrase, pair)
//! - Proof that a peer owns the identity they claim
//! - Metadata protection: identities and timestamps travel in the clear

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod derivation;
pub mod encryption;
pub mod error;
pub mod identity;
pub mod secret;

pub use derivation::{
    DerivedKey, KEY_SIZE, PARTICIPANT_DELIMITER, PBKDF2_ITERATIONS, SALT_PREFIX, derive_key,
    participant_salt,
};
pub use encryption::{
    EncodedMessage, EncryptedMessage, NONCE_SIZE, TAG_SIZE, decrypt_message, encrypt_message,
};
pub use error::CryptoError;
pub use identity::{IDENTITY_BYTES, encode_identity};
pub use secret::SharedSecret;
