//! CipherNet core
//!
//! Conversation-level confidentiality for a peer-to-peer messenger. Two users
//! who share a passphrase out of band derive the same key from it and their
//! two identities; every message is sealed with that key and stored as an
//! envelope in an append-only log.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  seal/open  ┌───────────────┐   append   ┌─────────────────┐
//! │ Identity   │────────────>│ MessageCipher │───────────>│ ConversationLog │
//! │ Contacts   │             │ (Environment) │            │ (envelopes)     │
//! └────────────┘             └───────────────┘            └─────────────────┘
//! ```
//!
//! - **Identities**: 128 random bits as lowercase hex, or pasted peer ids
//!   checked only for length.
//! - **MessageCipher**: re-derives the pair key per call, draws nonces, ids and
//!   timestamps from the injected [`Environment`], and reports failed opens as
//!   [`Decryption::Failed`] rather than as errors.
//! - **ConversationLog**: one ordered log for every conversation; the view for
//!   a pair is a filter over it.
//!
//! Key derivation and AEAD primitives live in `ciphernet-crypto`. Persistence
//! lives in `ciphernet-store`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod advisory;
pub mod cipher;
pub mod contacts;
pub mod env;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod log;

pub use advisory::{
    Advisor, DEFAULT_TOPIC, EMPTY_RESPONSE_TIP, FALLBACK_TIP, OfflineAdvisor, PLACEHOLDER_TIP,
    StaticAdvisor, tip_or_default,
};
pub use cipher::{DECRYPTION_FAILED_MARKER, Decryption, MessageCipher};
pub use ciphernet_crypto::SharedSecret;
pub use contacts::{Contact, ContactDirectory};
pub use env::Environment;
pub use envelope::{CIPHERTEXT_PREVIEW_CHARS, MessageEnvelope};
pub use error::{AdvisoryError, ContactError, EntropyError, LogError};
pub use identity::{Identity, LocalIdentity, MIN_PEER_IDENTITY_LEN};
pub use log::{ConversationLog, ImportReport};
