//! Application state machine.
//!
//! [`App`] holds everything the client knows for one local user and is
//! completely decoupled from I/O and cryptography. User intents enter through
//! methods, side-effect results through [`App::handle`]; both return
//! [`AppAction`] instructions for the runtime.
//!
//! # Responsibilities
//!
//! - Account lifecycle: register, restore, logout (optionally wiping).
//! - Contact admission and selection of the active conversation.
//! - The transient passphrase, which is never persisted and is dropped when
//!   the active conversation changes.
//! - Decrypt passes: each pass is tagged with a generation, and results for
//!   any generation but the current one are discarded.

use std::collections::HashMap;

use ciphernet_core::{
    Contact, ContactDirectory, ConversationLog, DEFAULT_TOPIC, Decryption, Identity, ImportReport,
    LocalIdentity, MessageEnvelope, PLACEHOLDER_TIP, SharedSecret,
};
use ciphernet_store::Session;

use crate::{
    AppAction, AppEvent,
    state::{ConversationEntry, Direction, EntryBody, Notice},
};

/// Shown when restore has neither a pasted identity nor a cached account
pub const MISSING_IDENTITY: &str = "Could not find a local identity. Please paste your Identity ID.";

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Signed-in account. `None` when logged out.
    account: Option<LocalIdentity>,
    /// Account found in storage, kept for restore after logout.
    cached_account: Option<LocalIdentity>,
    contacts: ContactDirectory,
    log: ConversationLog,
    /// Peer of the open conversation.
    active_peer: Option<Identity>,
    /// Transient; never persisted.
    passphrase: SharedSecret,
    /// Current decrypt generation. Bumped whenever the view is invalidated.
    generation: u64,
    /// Decrypt results of the current generation, by message id.
    decrypted: HashMap<String, Decryption>,
    tip: String,
    notice: Option<Notice>,
    /// Number of notices raised so far.
    notices: u64,
    last_import: Option<ImportReport>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an empty, logged-out App.
    pub fn new() -> Self {
        Self {
            account: None,
            cached_account: None,
            contacts: ContactDirectory::new(),
            log: ConversationLog::new(),
            active_peer: None,
            passphrase: SharedSecret::default(),
            generation: 0,
            decrypted: HashMap::new(),
            tip: PLACEHOLDER_TIP.to_string(),
            notice: None,
            notices: 0,
            last_import: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::SessionLoaded(Session { account, log, contacts }) => {
                self.close_conversation();
                self.cached_account.clone_from(&account);
                self.account = account;
                self.log = log;
                self.contacts = contacts;
                vec![AppAction::Render]
            },
            AppEvent::IdentityGenerated { username, id } => {
                let account = LocalIdentity::new(username, id);
                self.notify(Notice::info(format!("Registered as {}", account.username)));
                self.sign_in(account)
            },
            AppEvent::MessageSealed { envelope } => {
                let in_view = self.is_in_view(&envelope);
                if let Err(err) = self.log.append(envelope) {
                    self.notify(Notice::error(err.to_string()));
                    return vec![AppAction::Render];
                }

                let mut actions = vec![AppAction::PersistLog];
                if in_view {
                    actions.extend(self.refresh_view());
                }
                actions.push(AppAction::Render);
                actions
            },
            AppEvent::ConversationDecrypted { generation, results } => {
                if generation != self.generation {
                    tracing::debug!(
                        stale = generation,
                        current = self.generation,
                        "discarding superseded decrypt pass"
                    );
                    return vec![];
                }

                self.decrypted = results.into_iter().collect();
                vec![AppAction::Render]
            },
            AppEvent::EnvelopesReceived { envelopes } => self.receive(envelopes),
            AppEvent::TipReceived { tip } => {
                self.tip = tip;
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.notify(Notice::error(message));
                vec![AppAction::Render]
            },
        }
    }

    /// Register a new account under `username`.
    pub fn register(&mut self, username: &str) -> Vec<AppAction> {
        let username = username.trim();
        if username.is_empty() {
            return self.reject("Username is required.");
        }

        vec![AppAction::GenerateIdentity { username: username.to_string() }]
    }

    /// Sign in with an existing identity.
    ///
    /// A non-blank `pasted_id` wins; otherwise the cached account identity is
    /// reused.
    pub fn restore(&mut self, username: &str, pasted_id: Option<&str>) -> Vec<AppAction> {
        let username = username.trim();
        if username.is_empty() {
            return self.reject("Username is required.");
        }

        let pasted = pasted_id.map(str::trim).filter(|id| !id.is_empty()).map(Identity::new);
        let cached = self.cached_account.as_ref().map(|account| account.id.clone());
        let Some(id) = pasted.or(cached) else {
            return self.reject(MISSING_IDENTITY);
        };

        self.notify(Notice::info(format!("Signed in as {username}")));
        self.sign_in(LocalIdentity::new(username, id))
    }

    /// Sign out. With `wipe`, every persisted record and all in-memory
    /// history is deleted as well.
    pub fn logout(&mut self, wipe: bool) -> Vec<AppAction> {
        self.account = None;
        self.close_conversation();

        if !wipe {
            self.notify(Notice::info("Signed out."));
            return vec![AppAction::Render];
        }

        self.cached_account = None;
        self.log = ConversationLog::new();
        self.contacts = ContactDirectory::new();
        self.last_import = None;
        self.notify(Notice::info("Signed out and wiped local data."));
        vec![AppAction::WipeSession, AppAction::Render]
    }

    /// Admit a contact.
    pub fn add_contact(&mut self, name: &str, raw_id: &str) -> Vec<AppAction> {
        match self.contacts.add(name, raw_id).map(|contact| contact.name.clone()) {
            Ok(name) => {
                self.notify(Notice::info(format!("Added {name}")));
                vec![AppAction::PersistContacts, AppAction::Render]
            },
            Err(err) => self.reject(err.to_string()),
        }
    }

    /// Open the conversation with a contact.
    ///
    /// Any passphrase and decrypted view from the previous conversation are
    /// discarded, even when re-selecting the same contact.
    pub fn select_contact(&mut self, id: &Identity) -> Vec<AppAction> {
        if !self.contacts.contains(id) {
            return self.reject(format!("{id} is not a contact."));
        }

        self.close_conversation();
        self.active_peer = Some(id.clone());
        vec![AppAction::Render]
    }

    /// Set the passphrase for the active conversation and start a decrypt
    /// pass. An empty passphrase locks the view instead.
    pub fn set_passphrase(&mut self, secret: SharedSecret) -> Vec<AppAction> {
        if self.account.is_none() || self.active_peer.is_none() {
            return self.reject("Open a conversation first.");
        }

        self.passphrase = secret;
        let mut actions = self.refresh_view();
        actions.push(AppAction::Render);
        actions
    }

    /// Encrypt and send `text` in the active conversation.
    pub fn send(&mut self, text: &str) -> Vec<AppAction> {
        let sender = self.account.as_ref().map(|account| account.id.clone());
        let (Some(sender), Some(receiver)) = (sender, self.active_peer.clone()) else {
            return self.reject("Open a conversation first.");
        };
        if text.trim().is_empty() {
            return self.reject("Message is empty.");
        }
        if self.passphrase.is_empty() {
            return self.reject("Set a shared passphrase before sending.");
        }

        vec![AppAction::SealMessage {
            plaintext: text.to_string(),
            secret: self.passphrase.clone(),
            sender,
            receiver,
        }]
    }

    /// Request a fresh advisory tip.
    pub fn request_tip(&self) -> Vec<AppAction> {
        vec![AppAction::FetchTip { topic: DEFAULT_TOPIC.to_string() }]
    }

    /// Envelopes of the conversation with `peer`, for export.
    pub fn export_conversation(&self, peer: &Identity) -> Vec<MessageEnvelope> {
        match &self.account {
            Some(account) => self.log.for_conversation(&account.id, peer).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Find a contact by exact identity or display name (identity first).
    pub fn find_contact(&self, query: &str) -> Option<&Contact> {
        let query = query.trim();
        self.contacts
            .get(&Identity::new(query))
            .or_else(|| self.contacts.iter().find(|contact| contact.name.trim() == query))
    }

    /// Entries of the active conversation, in log order.
    pub fn conversation(&self) -> Vec<ConversationEntry> {
        let (Some(account), Some(peer)) = (&self.account, &self.active_peer) else {
            return Vec::new();
        };

        self.log
            .for_conversation(&account.id, peer)
            .map(|envelope| ConversationEntry {
                id: envelope.id.clone(),
                short_id: envelope.short_id().to_string(),
                direction: if envelope.sender_id == account.id {
                    Direction::Outgoing
                } else {
                    Direction::Incoming
                },
                timestamp: envelope.timestamp,
                body: self.body_for(envelope),
            })
            .collect()
    }

    /// Signed-in account.
    pub fn account(&self) -> Option<&LocalIdentity> {
        self.account.as_ref()
    }

    /// Account remembered from storage.
    pub fn cached_account(&self) -> Option<&LocalIdentity> {
        self.cached_account.as_ref()
    }

    /// Contact directory.
    pub fn contacts(&self) -> &ContactDirectory {
        &self.contacts
    }

    /// Full conversation log.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Peer of the open conversation.
    pub fn active_peer(&self) -> Option<&Identity> {
        self.active_peer.as_ref()
    }

    /// True if a passphrase is set for the open conversation.
    pub fn has_passphrase(&self) -> bool {
        !self.passphrase.is_empty()
    }

    /// Current decrypt generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Decrypt result for a message id in the current view.
    pub fn decrypted(&self, id: &str) -> Option<&Decryption> {
        self.decrypted.get(id)
    }

    /// Number of decrypt results held for the current view.
    pub fn decrypted_count(&self) -> usize {
        self.decrypted.len()
    }

    /// Current advisory tip.
    pub fn tip(&self) -> &str {
        &self.tip
    }

    /// Transient status notice.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Notices raised since the App was created. Changes on every notice,
    /// even when the text repeats.
    pub fn notice_count(&self) -> u64 {
        self.notices
    }

    /// Outcome of the last import.
    pub fn last_import(&self) -> Option<ImportReport> {
        self.last_import
    }

    fn sign_in(&mut self, account: LocalIdentity) -> Vec<AppAction> {
        self.close_conversation();
        self.cached_account = Some(account.clone());
        self.account = Some(account);
        vec![AppAction::PersistAccount, AppAction::Render]
    }

    fn receive(&mut self, envelopes: Vec<MessageEnvelope>) -> Vec<AppAction> {
        let Some(account) = &self.account else {
            return self.reject("Sign in before importing messages.");
        };

        let touches_view = envelopes.iter().any(|envelope| self.is_in_view(envelope));
        let report = self.log.import(envelopes, &account.id);
        self.last_import = Some(report);
        self.notify(Notice::info(format!(
            "Imported {} message(s); skipped {} duplicate(s) and {} unrelated.",
            report.added, report.duplicates, report.unrelated
        )));
        tracing::info!(
            added = report.added,
            duplicates = report.duplicates,
            unrelated = report.unrelated,
            "imported envelopes"
        );

        let mut actions = Vec::new();
        if report.added > 0 {
            actions.push(AppAction::PersistLog);
            if touches_view {
                actions.extend(self.refresh_view());
            }
        }
        actions.push(AppAction::Render);
        actions
    }

    /// Invalidate the current view and, with a passphrase, request a new pass.
    fn refresh_view(&mut self) -> Vec<AppAction> {
        self.generation += 1;
        self.decrypted.clear();

        let (Some(account), Some(peer)) = (&self.account, &self.active_peer) else {
            return vec![];
        };
        if self.passphrase.is_empty() {
            return vec![];
        }

        vec![AppAction::DecryptConversation {
            generation: self.generation,
            envelopes: self.log.for_conversation(&account.id, peer).cloned().collect(),
            secret: self.passphrase.clone(),
            my_id: account.id.clone(),
            peer_id: peer.clone(),
        }]
    }

    fn close_conversation(&mut self) {
        self.active_peer = None;
        self.passphrase = SharedSecret::default();
        self.generation += 1;
        self.decrypted.clear();
    }

    fn is_in_view(&self, envelope: &MessageEnvelope) -> bool {
        match (&self.account, &self.active_peer) {
            (Some(account), Some(peer)) => envelope.is_between(&account.id, peer),
            _ => false,
        }
    }

    fn body_for(&self, envelope: &MessageEnvelope) -> EntryBody {
        if self.passphrase.is_empty() {
            return EntryBody::Locked { preview: envelope.ciphertext_preview().to_string() };
        }

        match self.decrypted.get(&envelope.id) {
            Some(Decryption::Plaintext(text)) => EntryBody::Plaintext(text.clone()),
            Some(Decryption::Failed) => EntryBody::Failed,
            None => EntryBody::Pending,
        }
    }

    fn reject(&mut self, message: impl Into<String>) -> Vec<AppAction> {
        self.notify(Notice::error(message));
        vec![AppAction::Render]
    }

    fn notify(&mut self, notice: Notice) {
        self.notices += 1;
        self.notice = Some(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1";
    const BOB: &str = "b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2";
    const CAROL: &str = "c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3c3";

    fn envelope(id: &str, from: &str, to: &str) -> MessageEnvelope {
        MessageEnvelope {
            id: id.to_string(),
            sender_id: Identity::new(from),
            receiver_id: Identity::new(to),
            ciphertext: "Y2lwaGVydGV4dA==".to_string(),
            nonce: "AAAAAAAAAAAAAAAA".to_string(),
            timestamp: 1,
        }
    }

    fn signed_in() -> App {
        let mut app = App::new();
        let _ = app.handle(AppEvent::IdentityGenerated {
            username: "alice".to_string(),
            id: Identity::new(ALICE),
        });
        let _ = app.add_contact("Bob", BOB);
        app
    }

    fn chatting() -> App {
        let mut app = signed_in();
        let _ = app.select_contact(&Identity::new(BOB));
        app
    }

    #[test]
    fn register_requests_identity() {
        let mut app = App::new();

        let actions = app.register("  alice ");

        assert_eq!(actions, vec![AppAction::GenerateIdentity { username: "alice".to_string() }]);
    }

    #[test]
    fn register_rejects_blank_username() {
        let mut app = App::new();

        assert_eq!(app.register("   "), vec![AppAction::Render]);
        assert!(app.notice().is_some_and(Notice::is_error));
    }

    #[test]
    fn identity_generated_signs_in_and_persists() {
        let mut app = App::new();

        let actions = app.handle(AppEvent::IdentityGenerated {
            username: "alice".to_string(),
            id: Identity::new(ALICE),
        });

        assert_eq!(actions, vec![AppAction::PersistAccount, AppAction::Render]);
        assert_eq!(app.account().map(|a| a.id.as_str()), Some(ALICE));
        assert_eq!(app.cached_account(), app.account());
    }

    #[test]
    fn restore_prefers_pasted_identity() {
        let mut app = signed_in();
        let _ = app.logout(false);

        let _ = app.restore("alice", Some(format!("  {CAROL} ").as_str()));

        assert_eq!(app.account().map(|a| a.id.as_str()), Some(CAROL));
    }

    #[test]
    fn restore_falls_back_to_cached_identity() {
        let mut app = signed_in();
        let _ = app.logout(false);

        let actions = app.restore("alice", Some("   "));

        assert_eq!(actions, vec![AppAction::PersistAccount, AppAction::Render]);
        assert_eq!(app.account().map(|a| a.id.as_str()), Some(ALICE));
    }

    #[test]
    fn restore_without_any_identity_is_rejected() {
        let mut app = App::new();

        let _ = app.restore("alice", None);

        assert!(app.account().is_none());
        assert_eq!(app.notice().map(|n| n.text.as_str()), Some(MISSING_IDENTITY));
    }

    #[test]
    fn logout_keeps_history_unless_wiped() {
        let mut app = chatting();
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m1", ALICE, BOB) });

        assert_eq!(app.logout(false), vec![AppAction::Render]);
        assert!(app.account().is_none());
        assert!(app.active_peer().is_none());
        assert_eq!(app.log().len(), 1);
        assert_eq!(app.contacts().len(), 1);

        assert_eq!(app.logout(true), vec![AppAction::WipeSession, AppAction::Render]);
        assert!(app.log().is_empty());
        assert!(app.contacts().is_empty());
        assert!(app.cached_account().is_none());
    }

    #[test]
    fn add_contact_persists_on_success_only() {
        let mut app = signed_in();

        assert_eq!(app.add_contact("Carol", CAROL), vec![
            AppAction::PersistContacts,
            AppAction::Render
        ]);
        assert_eq!(app.add_contact("Bobby", &format!(" {BOB} ")), vec![AppAction::Render]);
        assert_eq!(app.add_contact("Short", "abc"), vec![AppAction::Render]);
        assert_eq!(app.contacts().len(), 2);
    }

    #[test]
    fn select_unknown_contact_is_rejected() {
        let mut app = signed_in();

        let _ = app.select_contact(&Identity::new(CAROL));

        assert!(app.active_peer().is_none());
        assert!(app.notice().is_some_and(Notice::is_error));
    }

    #[test]
    fn selecting_contact_clears_passphrase() {
        let mut app = chatting();
        let _ = app.set_passphrase(SharedSecret::new("apple"));
        assert!(app.has_passphrase());

        let _ = app.select_contact(&Identity::new(BOB));

        assert!(!app.has_passphrase());
        assert_eq!(app.decrypted_count(), 0);
    }

    #[test]
    fn set_passphrase_requests_decrypt_of_conversation_only() {
        let mut app = chatting();
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m1", ALICE, BOB) });
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m2", ALICE, CAROL) });
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m3", BOB, ALICE) });

        let actions = app.set_passphrase(SharedSecret::new("apple"));

        let [AppAction::DecryptConversation { generation, envelopes, .. }, AppAction::Render] =
            actions.as_slice()
        else {
            panic!("unexpected actions: {actions:?}");
        };
        assert_eq!(*generation, app.generation());
        let ids: Vec<_> = envelopes.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
    }

    #[test]
    fn empty_passphrase_locks_view() {
        let mut app = chatting();
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m1", ALICE, BOB) });

        let actions = app.set_passphrase(SharedSecret::default());

        assert_eq!(actions, vec![AppAction::Render]);
        let entries = app.conversation();
        assert_eq!(entries[0].body, EntryBody::Locked { preview: "Y2lwaGVydGV4dA==".to_string() });
    }

    #[test]
    fn stale_decrypt_results_are_discarded() {
        let mut app = chatting();
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m1", ALICE, BOB) });
        let _ = app.set_passphrase(SharedSecret::new("wrong"));
        let stale = app.generation();
        let _ = app.set_passphrase(SharedSecret::new("apple"));

        let actions = app.handle(AppEvent::ConversationDecrypted {
            generation: stale,
            results: vec![("m1".to_string(), Decryption::Failed)],
        });

        assert!(actions.is_empty());
        assert_eq!(app.conversation()[0].body, EntryBody::Pending);

        let _ = app.handle(AppEvent::ConversationDecrypted {
            generation: app.generation(),
            results: vec![("m1".to_string(), Decryption::Plaintext("hello".to_string()))],
        });
        assert_eq!(app.conversation()[0].body, EntryBody::Plaintext("hello".to_string()));
    }

    #[test]
    fn send_guards() {
        let mut app = signed_in();
        assert_eq!(app.send("hi"), vec![AppAction::Render]);

        let _ = app.select_contact(&Identity::new(BOB));
        assert_eq!(app.send("hi"), vec![AppAction::Render]);
        assert_eq!(app.notice().map(|n| n.text.as_str()), Some("Set a shared passphrase before sending."));

        let _ = app.set_passphrase(SharedSecret::new("apple"));
        assert_eq!(app.send("  \n "), vec![AppAction::Render]);

        let actions = app.send(" hi ");
        assert!(matches!(actions.as_slice(), [AppAction::SealMessage { plaintext, .. }] if plaintext == " hi "));
    }

    #[test]
    fn sealed_message_in_view_triggers_new_pass() {
        let mut app = chatting();
        let _ = app.set_passphrase(SharedSecret::new("apple"));
        let before = app.generation();

        let actions = app.handle(AppEvent::MessageSealed { envelope: envelope("m1", ALICE, BOB) });

        assert!(matches!(actions.as_slice(), [
            AppAction::PersistLog,
            AppAction::DecryptConversation { .. },
            AppAction::Render
        ]));
        assert!(app.generation() > before);
    }

    #[test]
    fn duplicate_sealed_message_is_reported() {
        let mut app = chatting();
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m1", ALICE, BOB) });

        let actions = app.handle(AppEvent::MessageSealed { envelope: envelope("m1", ALICE, BOB) });

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.log().len(), 1);
    }

    #[test]
    fn import_reports_and_persists() {
        let mut app = chatting();

        let actions = app.handle(AppEvent::EnvelopesReceived {
            envelopes: vec![envelope("m1", BOB, ALICE), envelope("m2", BOB, CAROL)],
        });

        assert_eq!(actions, vec![AppAction::PersistLog, AppAction::Render]);
        assert_eq!(app.last_import(), Some(ImportReport { added: 1, duplicates: 0, unrelated: 1 }));
    }

    #[test]
    fn conversation_marks_direction() {
        let mut app = chatting();
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m1-x", ALICE, BOB) });
        let _ = app.handle(AppEvent::MessageSealed { envelope: envelope("m2-y", BOB, ALICE) });

        let entries = app.conversation();

        assert_eq!(entries[0].direction, Direction::Outgoing);
        assert_eq!(entries[1].direction, Direction::Incoming);
        assert_eq!(entries[0].short_id, "m1");
    }

    #[test]
    fn find_contact_by_id_or_name() {
        let app = signed_in();

        assert_eq!(app.find_contact(BOB).map(|c| c.name.as_str()), Some("Bob"));
        assert_eq!(app.find_contact(" Bob ").map(|c| c.id.as_str()), Some(BOB));
        assert!(app.find_contact("Carol").is_none());
    }

    #[test]
    fn tip_starts_as_placeholder() {
        let mut app = App::new();
        assert_eq!(app.tip(), PLACEHOLDER_TIP);

        let _ = app.handle(AppEvent::TipReceived { tip: "Verify out of band.".to_string() });
        assert_eq!(app.tip(), "Verify out of band.");
    }

    #[test]
    fn repeated_rejection_counts_as_new_notice() {
        let mut app = chatting();

        let _ = app.send("   ");
        let first = app.notice_count();
        let _ = app.send("   ");

        assert_eq!(app.notice_count(), first + 1);
        assert!(app.notice().is_some_and(Notice::is_error));
    }
}
