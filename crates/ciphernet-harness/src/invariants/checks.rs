//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use ciphernet_app::EntryBody;

use super::{ClientSnapshot, Invariant, InvariantResult, SystemSnapshot, Violation};

fn check_clients(
    invariant: &'static str,
    state: &SystemSnapshot,
    check: impl Fn(&ClientSnapshot) -> Option<String>,
) -> InvariantResult {
    for client in &state.clients {
        if let Some(message) = check(client) {
            return Err(Violation { invariant, message: format!("{}: {message}", client.label) });
        }
    }
    Ok(())
}

/// The open conversation must be with a contact.
pub struct ActivePeerIsContact;

impl Invariant for ActivePeerIsContact {
    fn name(&self) -> &'static str {
        "active_peer_is_contact"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            let peer = client.active_peer.as_ref()?;
            (!client.contacts.contains(peer))
                .then(|| format!("active peer {peer} not in contacts {:?}", client.contacts))
        })
    }
}

/// A passphrase only exists while a conversation is open.
///
/// Switching or closing conversations must drop it, so a secret typed for
/// one peer is never applied to another.
pub struct PassphraseNeedsConversation;

impl Invariant for PassphraseNeedsConversation {
    fn name(&self) -> &'static str {
        "passphrase_needs_conversation"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            let open = client.account.is_some() && client.active_peer.is_some();
            (client.has_passphrase && !open)
                .then(|| "passphrase held with no open conversation".to_string())
        })
    }
}

/// Message ids are unique across the whole log.
pub struct UniqueMessageIds;

impl Invariant for UniqueMessageIds {
    fn name(&self) -> &'static str {
        "unique_message_ids"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            let mut seen = HashSet::new();
            client
                .log
                .iter()
                .find(|message| !seen.insert(message.id.as_str()))
                .map(|message| format!("message id {} logged twice", message.id))
        })
    }
}

/// Contact identities are unique.
pub struct UniqueContactIdentities;

impl Invariant for UniqueContactIdentities {
    fn name(&self) -> &'static str {
        "unique_contact_identities"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            let mut seen = HashSet::new();
            client
                .contacts
                .iter()
                .find(|id| !seen.insert(*id))
                .map(|id| format!("contact {id} admitted twice"))
        })
    }
}

/// The rendered conversation is exactly the log filtered to the open pair,
/// in log order.
pub struct ViewMatchesLog;

impl Invariant for ViewMatchesLog {
    fn name(&self) -> &'static str {
        "view_matches_log"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            let expected: Vec<&str> = match (&client.account, &client.active_peer) {
                (Some(me), Some(peer)) => client
                    .log
                    .iter()
                    .filter(|m| {
                        (m.sender == *me && m.receiver == *peer)
                            || (m.sender == *peer && m.receiver == *me)
                    })
                    .map(|m| m.id.as_str())
                    .collect(),
                _ => Vec::new(),
            };
            let rendered: Vec<&str> = client.view.iter().map(|entry| entry.id.as_str()).collect();

            (rendered != expected).then(|| format!("rendered {rendered:?}, log holds {expected:?}"))
        })
    }
}

/// Without a passphrase every entry shows ciphertext; with one, none does.
pub struct LockedWithoutPassphrase;

impl Invariant for LockedWithoutPassphrase {
    fn name(&self) -> &'static str {
        "locked_without_passphrase"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            let locked = client
                .view
                .iter()
                .filter(|entry| matches!(entry.body, EntryBody::Locked { .. }))
                .count();
            let expected = if client.has_passphrase { 0 } else { client.view.len() };

            (locked != expected).then(|| {
                format!(
                    "{locked} of {} entries locked with passphrase={}",
                    client.view.len(),
                    client.has_passphrase
                )
            })
        })
    }
}

/// Every held decrypt result belongs to an entry of the rendered
/// conversation.
///
/// Results from a superseded pass would show up here as surplus results or
/// as entries resolved against the wrong messages.
pub struct DecryptedWithinView;

impl Invariant for DecryptedWithinView {
    fn name(&self) -> &'static str {
        "decrypted_within_view"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            if !client.has_passphrase {
                return (client.decrypted_count != 0)
                    .then(|| format!("{} results held while locked", client.decrypted_count));
            }

            let resolved = client
                .view
                .iter()
                .filter(|entry| matches!(entry.body, EntryBody::Plaintext(_) | EntryBody::Failed))
                .count();
            (resolved != client.decrypted_count).then(|| {
                format!(
                    "{} results held but {resolved} entries resolved",
                    client.decrypted_count
                )
            })
        })
    }
}

/// Decrypt generations never decrease.
pub struct GenerationMonotonicity;

impl Invariant for GenerationMonotonicity {
    fn name(&self) -> &'static str {
        "generation_monotonicity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        check_clients(self.name(), state, |client| {
            client
                .generation_history
                .windows(2)
                .find(|window| window[1] < window[0])
                .map(|window| format!("generation decreased {} -> {}", window[0], window[1]))
        })
    }
}
