//! Fault-injecting store wrapper
//!
//! Delegates to an inner store but fails a seeded fraction of operations, so
//! tests can check that persistence failures surface as errors and never
//! corrupt in-memory state.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{KeyValueStore, StorageError};

/// Store wrapper that randomly injects failures.
///
/// Failure decisions come from a seeded generator, so two wrappers with the
/// same seed fail the same operations.
#[derive(Clone)]
pub struct ChaoticStore<S: KeyValueStore> {
    inner: S,
    /// 0.0 = never fail, 1.0 = always fail
    failure_rate: f64,
    rng: Arc<Mutex<FailureRng>>,
    operations: Arc<AtomicUsize>,
}

/// xorshift64* generator
struct FailureRng {
    state: u64,
}

impl FailureRng {
    fn new(seed: u64) -> Self {
        // xorshift state must be non-zero
        Self { state: seed | 1 }
    }

    /// Next value in [0.0, 1.0)
    fn next_unit(&mut self) -> f64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        let bits = self.state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

impl<S: KeyValueStore> ChaoticStore<S> {
    /// Wrap `inner` with the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x00C1_9E2E_7000_0001)
    }

    /// Wrap `inner` with an explicit seed for reproducible failures.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(FailureRng::new(seed))),
            operations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying store, for checking state after chaos.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Operations attempted so far, failed or not.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::Relaxed)
    }

    fn check(&self, operation: &'static str) -> Result<(), StorageError> {
        self.operations.fetch_add(1, Ordering::Relaxed);

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| StorageError::Io("chaotic rng lock poisoned".to_string()))?;
        if rng.next_unit() < self.failure_rate {
            tracing::trace!(operation, "injecting storage failure");
            return Err(StorageError::Injected { operation });
        }
        Ok(())
    }
}

impl<S: KeyValueStore> KeyValueStore for ChaoticStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check("get")?;
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check("put")?;
        self.inner.put(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check("remove")?;
        self.inner.remove(key)
    }
}
