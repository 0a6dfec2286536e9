//! Engine configuration.

use std::path::{Path, PathBuf};

/// Configuration for an [`Engine`][crate::engine::Engine].
///
/// # Examples
///
/// ```
/// use stirling_rs::config::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_cache_bits(12)
///     .with_max_recursion_depth(200);
/// assert_eq!(config.max_recursion_depth, 200);
/// assert!(config.disk_cache_dir.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory of the persistent cache; `None` keeps the engine memory-only.
    pub disk_cache_dir: Option<PathBuf>,
    /// Initial memory cache capacity is `2^cache_bits` entries (default: 12).
    ///
    /// The allocation is made up front, so it is capped at
    /// `2^`[`MAX_PREALLOC_BITS`][crate::cache::MAX_PREALLOC_BITS]
    /// entries; beyond that the cache grows as values are stored.
    pub cache_bits: usize,
    /// Rows beyond which the triangular strategy hands over to bottom-up (default: 500).
    pub max_recursion_depth: u64,
    /// Largest estimated relative error accepted from an alternating sum
    /// before it is reported as precision loss (default: 1e-8).
    ///
    /// The estimate is the rounding error of one term, amplified by the
    /// cancellation ratio `Σ |terms| / |Σ terms|`.
    pub max_relative_error: f64,
    /// Largest `(n, k)` evaluated by the direct explicit formula (default: `(50, 20)`).
    pub explicit_direct_limit: (u64, u64),
    /// Largest `n` evaluated by the direct `k = 1` product (default: 100).
    pub single_list_direct_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            disk_cache_dir: None,
            cache_bits: 12,
            max_recursion_depth: 500,
            max_relative_error: 1e-8,
            explicit_direct_limit: (50, 20),
            single_list_direct_limit: 100,
        }
    }
}

impl EngineConfig {
    pub fn with_disk_cache(mut self, dir: impl AsRef<Path>) -> Self {
        self.disk_cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_cache_bits(mut self, bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");
        self.cache_bits = bits;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: u64) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_max_relative_error(mut self, tolerance: f64) -> Self {
        self.max_relative_error = tolerance;
        self
    }

    pub fn with_explicit_direct_limit(mut self, n: u64, k: u64) -> Self {
        self.explicit_direct_limit = (n, k);
        self
    }

    pub fn with_single_list_direct_limit(mut self, n: u64) -> Self {
        self.single_list_direct_limit = n;
        self
    }
}
