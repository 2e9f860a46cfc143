//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture what a user could observe of one App at a point in time.
//! Invariants operate on snapshots rather than live state so every check in a
//! registry sees the same state.

use ciphernet_app::{App, ConversationEntry};
use ciphernet_core::Identity;

/// Snapshot of every simulated client.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }
}

/// A log record reduced to its routing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMessage {
    /// Message id.
    pub id: String,
    /// Author.
    pub sender: Identity,
    /// Recipient.
    pub receiver: Identity,
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Label used in violation messages.
    pub label: String,
    /// Signed-in identity.
    pub account: Option<Identity>,
    /// Peer of the open conversation.
    pub active_peer: Option<Identity>,
    /// Contact identities in directory order.
    pub contacts: Vec<Identity>,
    /// Whole log in order.
    pub log: Vec<LoggedMessage>,
    /// Whether a passphrase is set.
    pub has_passphrase: bool,
    /// Decrypt results held for the current generation.
    pub decrypted_count: usize,
    /// Rendered conversation.
    pub view: Vec<ConversationEntry>,
    /// Every generation observed so far, oldest first.
    pub generation_history: Vec<u64>,
}

impl ClientSnapshot {
    /// Capture the observable state of `app`.
    ///
    /// The generation history starts with the current generation only; use
    /// [`ClientSnapshot::with_history`] to carry earlier observations.
    pub fn from_app(label: impl Into<String>, app: &App) -> Self {
        Self {
            label: label.into(),
            account: app.account().map(|account| account.id.clone()),
            active_peer: app.active_peer().cloned(),
            contacts: app.contacts().iter().map(|contact| contact.id.clone()).collect(),
            log: app
                .log()
                .iter()
                .map(|envelope| LoggedMessage {
                    id: envelope.id.clone(),
                    sender: envelope.sender_id.clone(),
                    receiver: envelope.receiver_id.clone(),
                })
                .collect(),
            has_passphrase: app.has_passphrase(),
            decrypted_count: app.decrypted_count(),
            view: app.conversation(),
            generation_history: vec![app.generation()],
        }
    }

    /// Prepend previously observed generations.
    #[must_use]
    pub fn with_history(mut self, earlier: &[u64]) -> Self {
        let mut history = earlier.to_vec();
        history.append(&mut self.generation_history);
        self.generation_history = history;
        self
    }

    /// Latest observed generation.
    pub fn generation(&self) -> u64 {
        self.generation_history.last().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot() {
        let snapshot = SystemSnapshot::empty();
        assert!(snapshot.clients.is_empty());
    }

    #[test]
    fn fresh_app_snapshot() {
        let app = App::new();

        let client = ClientSnapshot::from_app("alice", &app).with_history(&[0]);

        assert_eq!(client.label, "alice");
        assert!(client.account.is_none());
        assert!(client.view.is_empty());
        assert_eq!(client.generation_history, vec![0, 0]);
        assert_eq!(client.generation(), 0);
    }
}
