//! Application side-effects and intents.
//!
//! [`AppAction`] values are instructions produced by the [`crate::App`] state
//! machine for the runtime to execute.

use ciphernet_core::{Identity, MessageEnvelope, SharedSecret};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Generate an identity for a new account.
    GenerateIdentity {
        /// Display name to register.
        username: String,
    },

    /// Save the current account record.
    PersistAccount,

    /// Save the whole conversation log.
    PersistLog,

    /// Save the contact directory.
    PersistContacts,

    /// Delete every persisted record.
    WipeSession,

    /// Encrypt an outgoing message.
    SealMessage {
        /// Message text.
        plaintext: String,
        /// Conversation passphrase.
        secret: SharedSecret,
        /// Local identity.
        sender: Identity,
        /// Active peer.
        receiver: Identity,
    },

    /// Decrypt every envelope of a conversation.
    DecryptConversation {
        /// Generation to report back.
        generation: u64,
        /// Envelopes in log order.
        envelopes: Vec<MessageEnvelope>,
        /// Conversation passphrase.
        secret: SharedSecret,
        /// Local identity.
        my_id: Identity,
        /// Active peer.
        peer_id: Identity,
    },

    /// Fetch an advisory tip.
    FetchTip {
        /// Tip topic.
        topic: String,
    },
}
