//! Simulated peers.
//!
//! A [`SimPeer`] is one user's client: a [`Runtime`] over an in-memory store
//! and a seeded environment, rendering through an invariant-checking
//! [`SimDriver`]. There is no transport; [`deliver`] moves a conversation
//! export from one peer into another the way users pass files around.

use ciphernet_app::{App, Runtime, RuntimeError};
use ciphernet_core::{FALLBACK_TIP, Identity, ImportReport, StaticAdvisor};
use ciphernet_store::MemoryStore;

use crate::{InvariantRegistry, SimDriver, SimEnv};

/// Runtime wired for simulation.
pub type SimRuntime = Runtime<SimDriver, MemoryStore, SimEnv, StaticAdvisor>;

/// One simulated user.
pub struct SimPeer {
    label: String,
    store: MemoryStore,
    env: SimEnv,
    runtime: SimRuntime,
}

impl SimPeer {
    /// Launch a client with empty storage and an RNG seeded from `seed`.
    pub async fn launch(label: &str, seed: u64) -> Result<Self, RuntimeError> {
        Self::launch_with(label, MemoryStore::new(), SimEnv::with_seed(seed)).await
    }

    /// Launch a client over existing storage and environment.
    pub async fn launch_with(
        label: &str,
        store: MemoryStore,
        env: SimEnv,
    ) -> Result<Self, RuntimeError> {
        let driver = SimDriver::new(label).with_invariants(InvariantRegistry::standard());
        let mut runtime =
            Runtime::new(driver, store.clone(), env.clone(), StaticAdvisor::new(FALLBACK_TIP));
        runtime.start().await?;

        Ok(Self { label: label.to_string(), store, env, runtime })
    }

    /// Close and relaunch the client. Only what was persisted survives.
    pub async fn relaunch(self) -> Result<Self, RuntimeError> {
        tracing::debug!(peer = %self.label, "relaunching");
        Self::launch_with(&self.label, self.store, self.env).await
    }

    /// Signed-in identity.
    pub fn id(&self) -> Option<&Identity> {
        self.app().account().map(|account| &account.id)
    }

    /// Client state.
    pub fn app(&self) -> &App {
        self.runtime.app()
    }

    /// Runtime, for driving intents.
    pub fn runtime(&mut self) -> &mut SimRuntime {
        &mut self.runtime
    }

    /// Driver, for render statistics.
    pub fn driver(&self) -> &SimDriver {
        self.runtime.driver()
    }

    /// Backing storage.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Seeded environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }
}

/// Export `from`'s conversation with `to` and import it into `to`.
///
/// Returns the import report, or `None` if either side is signed out.
pub async fn deliver(
    from: &SimPeer,
    to: &mut SimPeer,
) -> Result<Option<ImportReport>, RuntimeError> {
    let Some(recipient) = to.id().cloned() else {
        return Ok(None);
    };
    if from.id().is_none() {
        return Ok(None);
    }

    let envelopes = from.app().export_conversation(&recipient);
    tracing::debug!(from = %from.label, to = %to.label, count = envelopes.len(), "delivering");

    to.runtime().receive(envelopes).await?;
    Ok(to.app().last_import())
}
