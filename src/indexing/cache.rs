//! Bounded LRU cache of lookup results
//!
//! Results are tagged with the index version they were computed against.
//! Reads and writes for any other version are treated as misses, so a
//! lookup that raced with a rebuild can never repopulate the cache with
//! a result from the superseded catalog.

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::catalog::NormalizedText;
use crate::scoring::MatchResult;

/// Normalized query plus threshold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    specifications: String,
    threshold_bits: u64,
}

impl CacheKey {
    pub fn new(query: &NormalizedText, threshold: f64) -> Self {
        Self {
            name: query.name.clone(),
            specifications: query.specifications.clone(),
            // -0.0 and 0.0 share a key
            threshold_bits: (threshold + 0.0).to_bits(),
        }
    }
}

/// LRU result cache; a cached `None` records a confirmed "no match".
#[derive(Debug)]
pub struct ResultCache {
    entries: LruCache<CacheKey, Option<MatchResult>>,
    version: u64,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            version: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a result computed against index `version`, marking it
    /// most recently used.
    pub fn get(&mut self, version: u64, key: &CacheKey) -> Option<Option<MatchResult>> {
        let found = if version == self.version {
            self.entries.get(key).cloned()
        } else {
            None
        };
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }

    /// Store a result; returns false when `version` is stale. Evicts the
    /// least recently used entry when full.
    pub fn insert(&mut self, version: u64, key: CacheKey, result: Option<MatchResult>) -> bool {
        if version != self.version {
            return false;
        }
        self.entries.put(key, result);
        true
    }

    /// Drop every entry and start accepting results for `version`.
    pub fn reset(&mut self, version: u64) {
        self.entries.clear();
        self.version = version;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
