//! Fuzz target for session persistence under storage failures
//!
//! Saves and loads session records through a ChaoticStore that fails
//! operations at a seeded, configurable rate.
//!
//! # Strategy
//!
//! - Variable failure rates (0% to 90%)
//! - Interleaved account, log and contact saves, loads and wipes
//!
//! # Invariants
//!
//! - Storage failures surface as injected errors, NEVER panics
//! - A failed save leaves the last successfully saved record in place
//! - Whatever loads is a record that was saved at some point

#![no_main]

use arbitrary::Arbitrary;
use ciphernet_core::{Identity, LocalIdentity, MessageEnvelope};
use ciphernet_store::{ChaoticStore, MemoryStore, Session, SessionStore};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct ChaosScenario {
    /// Seed for ChaoticStore RNG (deterministic failures)
    chaos_seed: u64,
    /// Failure rate 0-9 maps to 0%-90%
    failure_rate_tenth: u8,
    operations: Vec<SessionOp>,
}

#[derive(Debug, Clone, Arbitrary)]
enum SessionOp {
    SaveAccount { name: u8 },
    AppendMessage,
    AddContact { suffix: u16 },
    Load,
    Wipe,
}

fuzz_target!(|scenario: ChaosScenario| {
    let failure_rate = f64::from(scenario.failure_rate_tenth % 10) / 10.0;
    let store = ChaoticStore::with_seed(MemoryStore::new(), failure_rate, scenario.chaos_seed);
    let sessions = SessionStore::new(store);
    let reader = SessionStore::new(sessions.store().inner().clone());

    let mut live = Session::default();
    let mut durable = Session::default();

    for (step, op) in scenario.operations.into_iter().enumerate() {
        match op {
            SessionOp::SaveAccount { name } => {
                let account = LocalIdentity::new(
                    format!("user{name}"),
                    Identity::new("aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111"),
                );
                live.account = Some(account.clone());
                match sessions.save_account(&account) {
                    Ok(()) => durable.account = Some(account),
                    Err(err) => assert!(err.is_injected()),
                }
            },
            SessionOp::AppendMessage => {
                let envelope = MessageEnvelope {
                    id: format!("m{step}"),
                    sender_id: Identity::new("aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111"),
                    receiver_id: Identity::new("bbbbbbbbbbbbbbbbbbbbbbbbbbbb2222"),
                    ciphertext: String::new(),
                    nonce: String::new(),
                    timestamp: step as u64,
                };
                live.log.append(envelope).expect("step ids are unique");
                match sessions.save_log(&live.log) {
                    Ok(()) => durable.log = live.log.clone(),
                    Err(err) => assert!(err.is_injected()),
                }
            },
            SessionOp::AddContact { suffix } => {
                let _ = live.contacts.add("peer", &format!("peer-{suffix:05}"));
                match sessions.save_contacts(&live.contacts) {
                    Ok(()) => durable.contacts = live.contacts.clone(),
                    Err(err) => assert!(err.is_injected()),
                }
            },
            SessionOp::Load => match sessions.load() {
                Ok(loaded) => assert_eq!(loaded, durable),
                Err(err) => assert!(err.is_injected()),
            },
            SessionOp::Wipe => match sessions.wipe() {
                Ok(()) => {
                    live = Session::default();
                    durable = Session::default();
                },
                // Some keys may already be gone; re-read what survived.
                Err(err) => {
                    assert!(err.is_injected());
                    durable = reader.load().expect("inner store never fails");
                },
            },
        }

        assert_eq!(reader.load().expect("inner store never fails"), durable);
    }
});
