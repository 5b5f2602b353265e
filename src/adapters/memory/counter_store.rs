//! In-memory counter store.
//!
//! Process-local counters and token buckets. Serves two roles: the test
//! double for the Redis store, and the degraded fallback the admission
//! controller switches to when the primary is unreachable. The clock is
//! injectable so rate tests run without sleeping.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::admission::TokenBucket;
use crate::ports::{CounterStore, StorageError};

type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

pub struct InMemoryCounterStore {
    counters: RwLock<HashMap<String, u32>>,
    buckets: RwLock<HashMap<String, TokenBucket>>,
    unavailable: AtomicBool,
    clock: Clock,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::with_clock(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64
        })
    }

    /// Creates a store whose bucket refills follow the given clock.
    pub fn with_clock(clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            buckets: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
            clock: Box::new(clock),
        }
    }

    /// Simulates an outage; every call fails with `Unavailable` until
    /// cleared. Test helper for fallback behavior.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Current counter value. Test helper.
    pub fn count(&self, key: &str) -> u32 {
        self.counters
            .read()
            .expect("counter lock poisoned")
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn guard(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn try_increment(&self, key: &str, limit: u32) -> Result<bool, StorageError> {
        self.guard()?;
        let mut counters = self.counters.write().expect("counter lock poisoned");
        let value = counters.entry(key.to_string()).or_insert(0);
        if *value >= limit {
            return Ok(false);
        }
        *value += 1;
        Ok(true)
    }

    async fn decrement(&self, key: &str) -> Result<(), StorageError> {
        self.guard()?;
        let mut counters = self.counters.write().expect("counter lock poisoned");
        if let Some(value) = counters.get_mut(key) {
            *value = value.saturating_sub(1);
            if *value == 0 {
                counters.remove(key);
            }
        }
        Ok(())
    }

    async fn try_take_token(
        &self,
        key: &str,
        rate_per_sec: u32,
        burst: u32,
    ) -> Result<bool, StorageError> {
        self.guard()?;
        let now_ms = (self.clock)();
        let mut buckets = self.buckets.write().expect("bucket lock poisoned");
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(rate_per_sec, burst, now_ms));
        Ok(bucket.try_take(now_ms))
    }
}
