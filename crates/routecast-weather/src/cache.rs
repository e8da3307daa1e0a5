//! Process-lifetime forecast cache with a fixed time-to-live.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::types::{CacheKey, ForecastSeries};

/// Default freshness window for cached forecasts.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Time source, injectable so expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Storage for fetched forecast series.
///
/// `get` never returns an entry whose age has reached the TTL.
pub trait ForecastCache: Send + Sync {
    fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<ForecastSeries>;

    /// Insert or overwrite the entry for `key`, stamped with `now`.
    fn put(&self, key: CacheKey, series: ForecastSeries, now: DateTime<Utc>);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: ForecastSeries,
    inserted_at: DateTime<Utc>,
}

/// In-memory cache. Grows without bound; expired entries are overwritten on refresh
/// or dropped by `purge_expired`.
#[derive(Debug)]
pub struct InMemoryForecastCache {
    ttl: chrono::Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryForecastCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::TimeDelta::MAX),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.inserted_at) < self.ttl
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry that is no longer fresh. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.signed_duration_since(entry.inserted_at) < self.ttl);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for InMemoryForecastCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ForecastCache for InMemoryForecastCache {
    fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<ForecastSeries> {
        let entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, now) => {
                tracing::debug!("Forecast cache hit for {}", key);
                Some(entry.series.clone())
            }
            Some(_) => {
                tracing::debug!("Forecast cache entry for {} expired", key);
                None
            }
            None => {
                tracing::debug!("Forecast cache miss for {}", key);
                None
            }
        }
    }

    fn put(&self, key: CacheKey, series: ForecastSeries, now: DateTime<Utc>) {
        self.entries.lock().insert(
            key,
            CacheEntry {
                series,
                inserted_at: now,
            },
        );
    }
}
