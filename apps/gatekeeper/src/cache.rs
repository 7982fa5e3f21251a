use crate::snapshot::EntitlementSnapshot;
use alloy::primitives::Address;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: EntitlementSnapshot,
    captured_at: Instant,
}

/// Snapshots keyed by wallet, valid for a fixed TTL after capture.
///
/// Entries are never evicted, only replaced; the map grows with the number of
/// distinct wallets seen.
pub struct EntitlementCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<Address, CacheEntry>>,
}

impl EntitlementCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the snapshot for `address` only while it is younger than the TTL.
    pub fn get(&self, address: &Address) -> Option<EntitlementSnapshot> {
        let now = self.clock.now();
        self.lock()
            .get(address)
            .filter(|entry| now.saturating_duration_since(entry.captured_at) < self.ttl)
            .map(|entry| entry.snapshot.clone())
    }

    pub fn insert(&self, address: Address, snapshot: EntitlementSnapshot) {
        let entry = CacheEntry {
            snapshot,
            captured_at: self.clock.now(),
        };
        self.lock().insert(address, entry);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Address, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
