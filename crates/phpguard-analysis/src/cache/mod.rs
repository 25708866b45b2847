//! AST cache: fingerprint-keyed, size-bounded, TTL-expiring store of parsed trees.
//!
//! One cache is shared by every rule in a run, so a file checked by N rules is
//! parsed once (1 miss, N-1 hits). Parse failures are never cached.

mod fingerprint;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use phpguard_core::config::CacheConfig;
use phpguard_core::errors::ParseError;
use serde::Serialize;

pub use fingerprint::{hash_content, Fingerprint};

use crate::parsers::ast::ParsedTree;
use crate::parsers::php::PhpParser;

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CacheLookup {
    Hit,
    Miss,
}

/// A tree returned by [`AstCache::get_or_parse`].
#[derive(Debug, Clone)]
pub struct CachedTree {
    pub tree: Arc<ParsedTree>,
    pub lookup: CacheLookup,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub ttl_seconds: u64,
    pub hits: u64,
    pub misses: u64,
    /// hits / (hits + misses); 0 before the first access.
    pub hit_rate: f64,
}

/// Fingerprint → tree cache backed by `moka`, with LRU eviction and a time-to-live.
///
/// Pending maintenance is flushed after every insert so `len() <= max_entries`
/// holds exactly, not eventually.
pub struct AstCache {
    inner: Cache<Fingerprint, Arc<ParsedTree>>,
    parser: PhpParser,
    max_entries: usize,
    ttl: Duration,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AstCache {
    /// Create a cache holding at most `max_entries` trees (minimum 1).
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let max_entries = max_entries.max(1);
        let inner = Cache::builder()
            .max_capacity(max_entries as u64)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self {
            inner,
            parser: PhpParser::new(),
            max_entries,
            ttl,
            enabled: true,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(
            config.effective_max_entries(),
            Duration::from_secs(config.effective_ttl_seconds()),
        );
        cache.enabled = config.effective_enabled();
        cache
    }

    /// Return the tree for `content`, parsing it on a miss.
    ///
    /// `path` only contributes its modification time to the fingerprint.
    pub fn get_or_parse(&self, path: &Path, content: &str) -> Result<CachedTree, ParseError> {
        let key = Fingerprint::compute(path, content);

        if self.stores() {
            if let Some(tree) = self.inner.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(file = %path.display(), "ast cache hit");
                return Ok(CachedTree {
                    tree,
                    lookup: CacheLookup::Hit,
                });
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(file = %path.display(), "ast cache miss");

        let tree = Arc::new(self.parser.parse(content)?);
        if self.stores() {
            self.inner.insert(key, Arc::clone(&tree));
            self.inner.run_pending_tasks();
        }
        Ok(CachedTree {
            tree,
            lookup: CacheLookup::Miss,
        })
    }

    // A zero TTL expires every entry on arrival, so nothing is worth storing.
    fn stores(&self) -> bool {
        self.enabled && !self.ttl.is_zero()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            size: self.len(),
            max_size: self.max_entries,
            ttl_seconds: self.ttl.as_secs(),
            hits,
            misses,
            hit_rate: if total > 0 { hits as f64 / total as f64 } else { 0.0 },
        }
    }

    /// Drop every entry and reset the hit/miss counters.
    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.inner.run_pending_tasks();
        self.inner.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AstCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
