// ── TTL cache ──
//
// Flat key → (value, expiry) map for shaped query results. DashMap
// gives atomic per-entry inserts, so a reader never observes a write
// in progress. Expired entries are treated as absent but are never
// proactively removed -- the key set is small and fixed per zone, so
// they only ever get overwritten.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

/// Cache lifetimes per data kind.
///
/// Slowly-changing telemetry (zone identity/config) gets a long TTL;
/// live readings get a short one. Monthly consumption is derived from
/// a monthly bucket that rarely changes mid-month, hence hours.
pub mod ttl {
    use std::time::Duration;

    pub const SYSTEM_INFO: Duration = Duration::from_secs(5 * 60);
    pub const ZONE_INFO: Duration = Duration::from_secs(30 * 60);
    pub const GAS_CONSUMPTION: Duration = Duration::from_secs(4 * 60 * 60);
    pub const WATER_PRESSURE: Duration = Duration::from_secs(5 * 60);
    pub const ZONE_LIST: Duration = Duration::from_secs(5 * 60);
    pub const FLOW_TEMPERATURE: Duration = Duration::from_secs(5 * 60);
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// In-memory TTL cache for shaped query results.
///
/// Each entry is written whole by exactly one fetch; `set` overwrites
/// unconditionally. Write operations elsewhere never invalidate
/// entries -- stale reads until natural expiry are accepted behavior.
#[derive(Default)]
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a value if it is still fresh.
    ///
    /// Returns the stored value only while `now` is strictly before the
    /// entry's expiry; an expired entry behaves as absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    /// Store a value with the given lifetime, overwriting any prior entry.
    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        self.entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub(crate) fn set_at(&self, key: &str, value: Value, ttl: Duration, now: Instant) {
        self.entries.insert(
            key.to_owned(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}
