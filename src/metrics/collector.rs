use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::StatsEntry;
use crate::config::{CollectorConfig, ConfigError};

// ─── Public types ────────────────────────────────────────────────

/// Callback fired after every successful `record()`.
///
/// Receives the endpoint key and a copy of the updated entry. It runs on the
/// recording thread after the store lock is released, so it may query the
/// collector. A panic inside the hook propagates to the caller of `record()`.
pub type UpdateHook = Arc<dyn Fn(&str, &StatsEntry) + Send + Sync>;

/// Rejected observations and broken store invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    #[error("endpoint key must not be empty")]
    EmptyKey,
    #[error("method must not be empty")]
    EmptyMethod,
    #[error("duration must be a finite, non-negative number of milliseconds (got {0})")]
    InvalidDuration(f64),
    #[error("store is full but holds no entry to evict")]
    NoEvictionCandidate,
}

/// Bounded, thread-safe per-endpoint latency accumulator.
/// The timing middleware calls `record()`, the `/stats` routes read.
pub struct MetricsCollector {
    max_endpoints: usize,
    on_update: Option<UpdateHook>,
    inner: RwLock<Inner>,
}

// ─── Internal state ──────────────────────────────────────────────

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Slot>,
    // Bumped on every record; orders both recency and insertion
    next_seq: u64,
}

struct Slot {
    entry: StatsEntry,
    /// Sequence number of the latest observation (LRU tie-break)
    touched: u64,
    /// Sequence number at creation (stable ranking order)
    inserted: u64,
}

// ─── MetricsCollector impl ───────────────────────────────────────

impl MetricsCollector {
    /// Collector with the default capacity and no hook.
    pub fn new() -> Self {
        Self {
            max_endpoints: CollectorConfig::default().max_endpoints,
            on_update: None,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn from_config(config: &CollectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            max_endpoints: config.max_endpoints,
            on_update: None,
            inner: RwLock::new(Inner::default()),
        })
    }

    /// Attach the on-update hook. At most one hook per collector; a second
    /// call replaces the first.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &StatsEntry) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(hook));
        self
    }

    /// Record one observation and return the key's new request count.
    ///
    /// A new key arriving at a full store evicts the least recently used
    /// entry first. Updating a key that is already tracked never evicts.
    pub fn record(
        &self,
        method: &str,
        key: &str,
        duration_ms: f64,
    ) -> Result<u64, StatsError> {
        if key.is_empty() {
            return Err(StatsError::EmptyKey);
        }
        if method.is_empty() {
            return Err(StatsError::EmptyMethod);
        }
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(StatsError::InvalidDuration(duration_ms));
        }

        let (count, view) = {
            let mut inner = self.inner.write();
            let entry =
                inner.record(method, key, duration_ms, self.max_endpoints, Utc::now())?;
            (entry.count, self.on_update.as_ref().map(|_| entry.clone()))
        };

        if let (Some(hook), Some(view)) = (&self.on_update, view) {
            hook(key, &view);
        }

        Ok(count)
    }

    /// Point lookup. Does not count as an access for LRU purposes.
    pub fn get(&self, key: &str) -> Option<StatsEntry> {
        self.inner.read().entries.get(key).map(|s| s.entry.clone())
    }

    /// Owned copy of every tracked entry.
    pub fn get_all(&self) -> HashMap<String, StatsEntry> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(k, s)| (k.clone(), s.entry.clone()))
            .collect()
    }

    /// Drop one key (`Some`) or everything (`None`). Missing keys are a no-op.
    pub fn reset(&self, key: Option<&str>) {
        let mut inner = self.inner.write();
        match key {
            Some(key) => {
                inner.entries.remove(key);
            }
            None => inner.entries.clear(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_endpoints
    }

    /// Every entry in insertion order. Rankings fall back to this order
    /// when two endpoints tie.
    pub(super) fn entries_in_insertion_order(&self) -> Vec<(String, StatsEntry)> {
        let inner = self.inner.read();
        let mut slots: Vec<(&String, &Slot)> = inner.entries.iter().collect();
        slots.sort_unstable_by_key(|(_, s)| s.inserted);
        slots
            .into_iter()
            .map(|(k, s)| (k.clone(), s.entry.clone()))
            .collect()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("max_endpoints", &self.max_endpoints)
            .field("endpoints", &self.len())
            .field("has_hook", &self.on_update.is_some())
            .finish()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn record(
        &mut self,
        method: &str,
        key: &str,
        duration_ms: f64,
        capacity: usize,
        now: DateTime<Utc>,
    ) -> Result<&StatsEntry, StatsError> {
        self.next_seq += 1;
        let seq = self.next_seq;

        // Only a genuinely new key may grow the store
        if !self.entries.contains_key(key) && self.entries.len() >= capacity {
            self.evict_lru()?;
        }

        let slot = self.entries.entry(key.to_owned()).or_insert_with(|| Slot {
            entry: StatsEntry::new(method, key, now),
            touched: seq,
            inserted: seq,
        });
        slot.touched = seq;
        slot.entry.observe(duration_ms, now);

        Ok(&slot.entry)
    }

    /// Remove the entry with the oldest access, sequence number breaking
    /// timestamp ties.
    fn evict_lru(&mut self) -> Result<(), StatsError> {
        let victim = self
            .entries
            .iter()
            .min_by(|(_, a), (_, b)| {
                a.entry
                    .last_accessed_at
                    .cmp(&b.entry.last_accessed_at)
                    .then(a.touched.cmp(&b.touched))
            })
            .map(|(k, _)| k.clone())
            .ok_or(StatsError::NoEvictionCandidate)?;

        self.entries.remove(&victim);
        tracing::debug!(endpoint = %victim, "evicted least recently used endpoint");
        Ok(())
    }
}
