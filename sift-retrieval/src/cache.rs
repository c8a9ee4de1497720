//! Result cache keyed by the normalized query and every option that can
//! change the answer.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use sift_core::cache::TtlCache;
use sift_core::clock::Clock;
use sift_core::config::CacheConfig;
use sift_core::hashing::sha256_hex;
use sift_core::models::{CacheStats, Corpus, SearchMode, SearchResult};
use sift_observability::tracing_setup::events;

#[derive(Serialize)]
struct KeyParts<'a> {
    query: &'a str,
    corpus: Corpus,
    limit: usize,
    mode: SearchMode,
    rerank: bool,
}

/// Trim, lowercase and collapse runs of whitespace.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA-256 over the canonical JSON of the normalized query and options.
pub fn cache_key(query: &str, corpus: Corpus, limit: usize, mode: SearchMode, rerank: bool) -> String {
    let normalized = normalize_query(query);
    let parts = KeyParts {
        query: &normalized,
        corpus,
        limit,
        mode,
        rerank,
    };
    // Serializing a struct of strings, enums and integers cannot fail.
    let canonical = serde_json::to_string(&parts).unwrap_or_default();
    sha256_hex(&canonical)
}

pub struct ResultCache {
    enabled: bool,
    inner: TtlCache<Vec<SearchResult>>,
}

impl ResultCache {
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            enabled: config.enabled,
            inner: TtlCache::new(
                Duration::from_secs(config.result_ttl_secs),
                config.max_entries,
                clock,
            ),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, key: &str) -> Option<Vec<SearchResult>> {
        if !self.enabled {
            return None;
        }
        self.inner.get(key)
    }

    /// Store a result list. Returns false when the write was dropped.
    pub fn insert(&self, key: String, results: Vec<SearchResult>) -> bool {
        if !self.enabled {
            return false;
        }
        match self.inner.insert(key, results) {
            Ok(()) => true,
            Err(e) => {
                events::cache_write_failed("result", &e.to_string());
                false
            }
        }
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::clock::ManualClock;

    #[test]
    fn whitespace_and_case_do_not_change_the_key() {
        let a = cache_key("  Send   Email ", Corpus::Nodes, 10, SearchMode::Hybrid, false);
        let b = cache_key("send email", Corpus::Nodes, 10, SearchMode::Hybrid, false);
        assert_eq!(a, b);
    }

    #[test]
    fn every_option_is_part_of_the_key() {
        let base = cache_key("q", Corpus::Nodes, 10, SearchMode::Hybrid, false);
        assert_ne!(base, cache_key("q", Corpus::Templates, 10, SearchMode::Hybrid, false));
        assert_ne!(base, cache_key("q", Corpus::Nodes, 11, SearchMode::Hybrid, false));
        assert_ne!(base, cache_key("q", Corpus::Nodes, 10, SearchMode::Lexical, false));
        assert_ne!(base, cache_key("q", Corpus::Nodes, 10, SearchMode::Hybrid, true));
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let cache = ResultCache::new(&config, Arc::new(ManualClock::default()));
        assert!(!cache.insert("k".into(), vec![]));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn entries_expire_with_the_result_ttl() {
        let clock = Arc::new(ManualClock::default());
        let cache = ResultCache::new(&CacheConfig::default(), clock.clone());
        assert!(cache.insert("k".into(), vec![]));
        clock.advance(chrono::Duration::seconds(299));
        assert_eq!(cache.get("k"), Some(vec![]));
        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn full_cache_drops_the_write() {
        let config = CacheConfig {
            max_entries: 1,
            ..CacheConfig::default()
        };
        let cache = ResultCache::new(&config, Arc::new(ManualClock::default()));
        assert!(cache.insert("a".into(), vec![]));
        assert!(!cache.insert("b".into(), vec![]));
        assert_eq!(cache.get("b"), None);
    }
}
