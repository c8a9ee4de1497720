//! TTL key-value cache with an injected clock.
//!
//! Entries are written once and never mutated. An expired entry is inert:
//! reads treat it as a miss and remove it, and the next insert replaces it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::clock::Clock;
use crate::errors::CacheError;
use crate::models::CacheStats;

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: chrono::Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(5200));
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// When the cache holds `max_entries` live entries and `key` is new,
    /// expired entries are purged first; if that frees nothing the write fails.
    pub fn insert(&self, key: String, value: V) -> Result<(), CacheError> {
        let now = self.clock.now();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.purge_expired_at(now);
            if self.entries.len() >= self.max_entries {
                return Err(CacheError::Full {
                    capacity: self.max_entries,
                });
            }
        }
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key, CacheEntry { value, expires_at });
        Ok(())
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(self.clock.now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.iter().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            entries: self.len(),
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}
