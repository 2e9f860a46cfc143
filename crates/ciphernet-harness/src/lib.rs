//! Deterministic simulation harness for CipherNet testing.
//!
//! Seeded implementations of the Environment and Driver traits, so whole
//! conversations between simulated peers are reproducible from a seed.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks over App snapshots. Invariants verify WHAT must be true after every
//! render, not specific scenarios. Use [`InvariantRegistry::standard()`] for
//! the common App invariants.
//!
//! # Peers
//!
//! [`SimPeer`] wires a [`ciphernet_app::Runtime`] to a [`SimDriver`], an
//! in-memory store and a [`SimEnv`]. Peers exchange envelopes the way users
//! do: export from one, import into the other.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod peer;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    ActivePeerIsContact, ClientSnapshot, DecryptedWithinView, GenerationMonotonicity, Invariant,
    InvariantRegistry, InvariantResult, LockedWithoutPassphrase, LoggedMessage,
    PassphraseNeedsConversation, SystemSnapshot, UniqueContactIdentities, UniqueMessageIds,
    ViewMatchesLog, Violation,
};
pub use peer::{SimPeer, SimRuntime, deliver};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::SimEnv;
