//! Application input events.
//!
//! [`AppEvent`] carries results of side effects back into the
//! [`crate::App`] state machine. User intents enter through `App` methods
//! instead; events are what the runtime reports after executing an action.

use ciphernet_core::{Decryption, Identity, MessageEnvelope};
use ciphernet_store::Session;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Persisted session read at startup.
    SessionLoaded(Session),

    /// A fresh identity was generated for a pending registration.
    IdentityGenerated {
        /// Requested display name.
        username: String,
        /// New identity.
        id: Identity,
    },

    /// An outgoing message was encrypted.
    MessageSealed {
        /// Envelope to append.
        envelope: MessageEnvelope,
    },

    /// A decrypt pass finished.
    ConversationDecrypted {
        /// Generation the pass was started for.
        generation: u64,
        /// `(message id, outcome)` in log order.
        results: Vec<(String, Decryption)>,
    },

    /// Envelopes arrived out of band (import).
    EnvelopesReceived {
        /// Envelopes in exchange order.
        envelopes: Vec<MessageEnvelope>,
    },

    /// Advisory tip fetched.
    TipReceived {
        /// Tip text.
        tip: String,
    },

    /// A side effect failed without stopping the runtime, such as a save
    /// rejected by storage.
    Error {
        /// Error description.
        message: String,
    },
}
