//! Generic runtime for application orchestration.
//!
//! The Runtime executes the actions produced by [`App`], coordinating:
//! - [`SessionStore`]: persistence of account, log and contacts
//! - [`MessageCipher`]: sealing and opening, run on the blocking pool since
//!   every call runs a full key derivation
//! - [`Advisor`]: advisory tips
//! - [`Driver`]: presentation
//!
//! Results of side effects are fed back to the App as [`AppEvent`]s until no
//! actions remain.

use ciphernet_core::{
    Advisor, Environment, Identity, MessageCipher, MessageEnvelope, SharedSecret, tip_or_default,
};
use ciphernet_store::{KeyValueStore, SessionStore};

use crate::{App, AppAction, AppEvent, Driver, RuntimeError};

/// Generic runtime that executes App actions.
///
/// # Type Parameters
///
/// - `D`: presentation driver
/// - `S`: key-value backend
/// - `E`: environment for randomness and time
/// - `A`: advisory source
pub struct Runtime<D, S, E, A>
where
    D: Driver,
    S: KeyValueStore,
    E: Environment,
    A: Advisor,
{
    driver: D,
    app: App,
    sessions: SessionStore<S>,
    cipher: MessageCipher<E>,
    advisor: A,
}

impl<D, S, E, A> Runtime<D, S, E, A>
where
    D: Driver,
    S: KeyValueStore,
    E: Environment,
    A: Advisor,
{
    /// Create a runtime with an empty App. Call [`Runtime::start`] to load
    /// the persisted session.
    pub fn new(driver: D, store: S, env: E, advisor: A) -> Self {
        Self {
            driver,
            app: App::new(),
            sessions: SessionStore::new(store),
            cipher: MessageCipher::new(env),
            advisor,
        }
    }

    /// Load the persisted session into the App.
    ///
    /// # Errors
    ///
    /// Backend failures. Malformed records load as empty.
    pub async fn start(&mut self) -> Result<(), RuntimeError> {
        let session = self.sessions.load()?;
        let actions = self.app.handle(AppEvent::SessionLoaded(session));
        self.process_actions(actions).await
    }

    /// Register a new account.
    pub async fn register(&mut self, username: &str) -> Result<(), RuntimeError> {
        let actions = self.app.register(username);
        self.process_actions(actions).await
    }

    /// Sign in with a pasted or cached identity.
    pub async fn restore(
        &mut self,
        username: &str,
        pasted_id: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let actions = self.app.restore(username, pasted_id);
        self.process_actions(actions).await
    }

    /// Sign out, optionally wiping persisted data.
    pub async fn logout(&mut self, wipe: bool) -> Result<(), RuntimeError> {
        let actions = self.app.logout(wipe);
        self.process_actions(actions).await
    }

    /// Admit a contact.
    pub async fn add_contact(&mut self, name: &str, raw_id: &str) -> Result<(), RuntimeError> {
        let actions = self.app.add_contact(name, raw_id);
        self.process_actions(actions).await
    }

    /// Open the conversation with `peer`.
    pub async fn select_contact(&mut self, peer: &Identity) -> Result<(), RuntimeError> {
        let actions = self.app.select_contact(peer);
        self.process_actions(actions).await
    }

    /// Set the passphrase and decrypt the open conversation.
    pub async fn set_passphrase(&mut self, secret: SharedSecret) -> Result<(), RuntimeError> {
        let actions = self.app.set_passphrase(secret);
        self.process_actions(actions).await
    }

    /// Encrypt and append a message to the open conversation.
    pub async fn send(&mut self, text: &str) -> Result<(), RuntimeError> {
        let actions = self.app.send(text);
        self.process_actions(actions).await
    }

    /// Merge envelopes received out of band.
    pub async fn receive(&mut self, envelopes: Vec<MessageEnvelope>) -> Result<(), RuntimeError> {
        let actions = self.app.handle(AppEvent::EnvelopesReceived { envelopes });
        self.process_actions(actions).await
    }

    /// Fetch a fresh advisory tip.
    pub async fn refresh_tip(&mut self) -> Result<(), RuntimeError> {
        let actions = self.app.request_tip();
        self.process_actions(actions).await
    }

    /// Execute actions, feeding results back to the App until none remain.
    ///
    /// A storage failure is reported to the App as an error notice and the
    /// remaining actions still run, so the view stays current while storage
    /// lags behind.
    ///
    /// # Errors
    ///
    /// - The first storage failure, after every action has run
    /// - Any other failure stops processing immediately. Actions not yet
    ///   executed are dropped.
    pub async fn process_actions(
        &mut self,
        initial_actions: Vec<AppAction>,
    ) -> Result<(), RuntimeError> {
        let mut pending_actions = initial_actions;
        let mut storage_failure = None;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                let event = match self.execute(action).await {
                    Ok(event) => event,
                    Err(RuntimeError::Storage(err)) => {
                        tracing::warn!(error = %err, "session not persisted");
                        let message = format!("Could not save: {err}");
                        storage_failure.get_or_insert(err);
                        Some(AppEvent::Error { message })
                    },
                    Err(err) => return Err(err),
                };

                if let Some(event) = event {
                    pending_actions.extend(self.app.handle(event));
                }
            }
        }

        match storage_failure {
            Some(err) => Err(RuntimeError::Storage(err)),
            None => Ok(()),
        }
    }

    /// Execute one action. Returns the event reporting its result, if any.
    async fn execute(&mut self, action: AppAction) -> Result<Option<AppEvent>, RuntimeError> {
        match action {
            AppAction::Render => {
                self.driver.render(&self.app).map_err(|e| RuntimeError::Driver(Box::new(e)))?;
                Ok(None)
            },
            AppAction::GenerateIdentity { username } => {
                let id = Identity::generate(self.cipher.env())?;
                tracing::info!(%id, "generated identity");
                Ok(Some(AppEvent::IdentityGenerated { username, id }))
            },
            AppAction::PersistAccount => {
                if let Some(account) = self.app.account() {
                    self.sessions.save_account(account)?;
                }
                Ok(None)
            },
            AppAction::PersistLog => {
                self.sessions.save_log(self.app.log())?;
                Ok(None)
            },
            AppAction::PersistContacts => {
                self.sessions.save_contacts(self.app.contacts())?;
                Ok(None)
            },
            AppAction::WipeSession => {
                self.sessions.wipe()?;
                Ok(None)
            },
            AppAction::SealMessage { plaintext, secret, sender, receiver } => {
                let cipher = self.cipher.clone();
                let envelope = tokio::task::spawn_blocking(move || {
                    cipher.seal(&plaintext, &secret, &sender, &receiver)
                })
                .await
                .map_err(|e| RuntimeError::Task(e.to_string()))??;

                tracing::debug!(id = %envelope.id, peer = %envelope.receiver_id, "sealed message");
                Ok(Some(AppEvent::MessageSealed { envelope }))
            },
            AppAction::DecryptConversation { generation, envelopes, secret, my_id, peer_id } => {
                let cipher = self.cipher.clone();
                let count = envelopes.len();
                let results = tokio::task::spawn_blocking(move || {
                    cipher.open_all(&envelopes, &secret, &my_id, &peer_id)
                })
                .await
                .map_err(|e| RuntimeError::Task(e.to_string()))?;

                tracing::debug!(generation, count, "decrypt pass finished");
                Ok(Some(AppEvent::ConversationDecrypted { generation, results }))
            },
            AppAction::FetchTip { topic } => {
                let tip = tip_or_default(&self.advisor, &topic).await;
                Ok(Some(AppEvent::TipReceived { tip }))
            },
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a reference to the session store
    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }
}
