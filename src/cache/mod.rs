//! Two-tier cache for computed Stirling numbers.
//!
//! | Tier | Scope | Lifetime | Clear |
//! |------|-------|----------|-------|
//! | [`MemoryCache`] | one engine | until [`Engine::clear_cache`] | O(n) |
//! | [`DiskCache`] | any engine, any process | until [`Engine::clear_disk_cache`] | per file |
//!
//! Both tiers use the same [`CacheKey`]: the method tag, `(n, k)` and the
//! exact bit patterns of `(α, β, r)`. Keying on the full parameter tuple lets
//! differently parametrized engines share one cache directory without ever
//! reading each other's values.
//!
//! A lookup goes memory, then disk, then computation; a computed result is
//! written to both tiers. Disk failures never abort a computation, they are
//! logged and counted in [`CacheStats::disk_errors`].
//!
//! [`Engine::clear_cache`]: crate::engine::Engine::clear_cache
//! [`Engine::clear_disk_cache`]: crate::engine::Engine::clear_disk_cache

mod disk;
mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use disk::DiskCache;
pub use memory::{MemoryCache, MAX_PREALLOC_BITS};

use crate::types::{Method, Params, ParamsKey};

/// Key of a cached value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub method: Method,
    pub n: u64,
    pub k: u64,
    pub params: ParamsKey,
}

impl CacheKey {
    pub fn new(method: Method, n: u64, k: u64, params: &Params) -> Self {
        Self {
            method,
            n,
            k,
            params: params.key(),
        }
    }

    /// File name of the disk entry; it embeds every component of the key.
    pub fn file_name(&self) -> String {
        format!(
            "{}-n{}-k{}-{}.json",
            self.method.tag(),
            self.n,
            self.k,
            self.params
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})[{}]", self.method, self.n, self.k, self.params)
    }
}

/// Counters of both cache tiers.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub memory_hits: usize,
    pub memory_misses: usize,
    pub disk_hits: usize,
    pub disk_misses: usize,
    pub disk_writes: usize,
    pub disk_errors: usize,
}

impl CacheStats {
    /// Fraction of lookups answered by either tier.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.disk_hits;
        let total = self.memory_hits + self.memory_misses;
        if total > 0 {
            hits.min(total) as f64 / total as f64
        } else {
            0.0
        }
    }
}
