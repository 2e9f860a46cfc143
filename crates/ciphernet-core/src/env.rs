//! Environment abstraction for deterministic testing.
//!
//! Decouples message handling from system resources (wall-clock time,
//! randomness). Production wiring supplies the OS CSPRNG and system clock;
//! tests supply fixed or seeded sources so nonces, identities and message ids
//! are reproducible.

use crate::error::EntropyError;

/// Abstract environment providing wall-clock time and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - `random_bytes()` fails rather than returning predictable bytes when the
///   entropy source is unavailable
pub trait Environment: Clone + Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    ///
    /// Used for envelope timestamps only. Ordering of the log never depends on
    /// it, so a clock that jumps is harmless.
    fn wall_clock_millis(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG
    ///
    /// # Errors
    ///
    /// `EntropyError` is fatal: there is no meaningful retry.
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError>;

    /// Random fixed-size array.
    fn random_array<const N: usize>(&self) -> Result<[u8; N], EntropyError> {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes)?;
        Ok(bytes)
    }

    /// Generates a random `u128`.
    fn random_u128(&self) -> Result<u128, EntropyError> {
        Ok(u128::from_be_bytes(self.random_array()?))
    }
}

/// Deterministic environments for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    use super::Environment;
    use crate::error::EntropyError;

    /// Default clock start: 2023-11-14T22:13:20Z
    pub const DEFAULT_START_MILLIS: u64 = 1_700_000_000_000;

    /// Counter-based environment.
    ///
    /// Every `random_bytes` call writes an incrementing counter (starting at
    /// 1) big-endian into the tail of the buffer and zeroes the rest, so
    /// successive nonces and ids are distinct and predictable. The clock only
    /// moves when told to.
    #[derive(Clone)]
    pub struct FixedEnv {
        counter: Arc<AtomicU64>,
        clock_millis: Arc<AtomicU64>,
    }

    impl FixedEnv {
        /// Counter at zero, clock at [`DEFAULT_START_MILLIS`].
        pub fn new() -> Self {
            Self::with_clock(DEFAULT_START_MILLIS)
        }

        /// Counter at zero, clock at `start_millis`.
        pub fn with_clock(start_millis: u64) -> Self {
            Self {
                counter: Arc::new(AtomicU64::new(0)),
                clock_millis: Arc::new(AtomicU64::new(start_millis)),
            }
        }

        /// Move the clock forward.
        pub fn advance_clock(&self, millis: u64) {
            self.clock_millis.fetch_add(millis, Ordering::SeqCst);
        }

        /// Number of `random_bytes` calls so far.
        pub fn draws(&self) -> u64 {
            self.counter.load(Ordering::SeqCst)
        }
    }

    impl Default for FixedEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Environment for FixedEnv {
        fn wall_clock_millis(&self) -> u64 {
            self.clock_millis.load(Ordering::SeqCst)
        }

        fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
            let value = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            let counter_bytes = value.to_be_bytes();

            buffer.fill(0);
            let take = buffer.len().min(counter_bytes.len());
            let start = buffer.len() - take;
            buffer[start..].copy_from_slice(&counter_bytes[counter_bytes.len() - take..]);
            Ok(())
        }
    }

    /// Environment whose entropy source is always unavailable.
    #[derive(Clone, Default)]
    pub struct ExhaustedEnv;

    impl Environment for ExhaustedEnv {
        fn wall_clock_millis(&self) -> u64 {
            DEFAULT_START_MILLIS
        }

        fn random_bytes(&self, _buffer: &mut [u8]) -> Result<(), EntropyError> {
            Err(EntropyError::Unavailable { reason: "entropy source exhausted".to_string() })
        }
    }
}
