//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` is the production implementation of the Environment trait: the
//! OS CSPRNG through getrandom and the system wall clock. Production behavior
//! is non-deterministic by nature.

use ciphernet_core::{EntropyError, Environment};

/// Production environment using the system clock and cryptographic RNG.
///
/// # Security
///
/// getrandom provides OS-level cryptographic randomness (e.g. `getrandom(2)`
/// on Linux, `BCryptGenRandom` on Windows). A failure is reported as
/// [`EntropyError`] and no identity, nonce or message id is produced.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    #[allow(clippy::expect_used)]
    fn wall_clock_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)")
            .as_millis() as u64
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buffer).map_err(|e| EntropyError::Unavailable { reason: e.to_string() })
    }
}
