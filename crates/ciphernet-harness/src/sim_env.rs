//! Seeded simulation environment.
//!
//! [`SimEnv`] replaces the OS CSPRNG with a ChaCha20 stream seeded from a
//! `u64`, and the system clock with a virtual clock that ticks on every read.
//! Two environments built from the same seed produce the same identities,
//! nonces and message ids in the same order.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use ciphernet_core::{EntropyError, Environment, env::test_utils::DEFAULT_START_MILLIS};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Virtual milliseconds that pass between two clock reads.
pub const CLOCK_STEP_MILLIS: u64 = 1_000;

/// Deterministic environment for simulation.
///
/// Clones share the RNG stream and the clock.
#[derive(Clone)]
pub struct SimEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
    clock_millis: Arc<AtomicU64>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl SimEnv {
    /// Environment seeded with `seed`, clock at [`DEFAULT_START_MILLIS`].
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
            clock_millis: Arc::new(AtomicU64::new(DEFAULT_START_MILLIS)),
        }
    }

    /// Current virtual time without advancing it.
    pub fn now_millis(&self) -> u64 {
        self.clock_millis.load(Ordering::SeqCst)
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, millis: u64) {
        self.clock_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Environment for SimEnv {
    fn wall_clock_millis(&self) -> u64 {
        self.clock_millis.fetch_add(CLOCK_STEP_MILLIS, Ordering::SeqCst)
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let mut rng = self.rng.lock().map_err(|_| EntropyError::Unavailable {
            reason: "simulation rng lock poisoned".to_string(),
        })?;
        rng.fill_bytes(buffer);
        Ok(())
    }
}
