//! The computation engine.
//!
//! An [`Engine`] owns a fixed parameter set, a memory cache and, optionally,
//! a handle to a disk cache directory. Every request goes through
//! [`Engine::compute_value`]:
//!
//! 1. closed-form base cases (`k = 0`, `k >= n`) are answered immediately;
//! 2. [`Method::Auto`] is resolved by [`select_method`];
//! 3. the memory tier, then the disk tier, are consulted;
//! 4. the strategy runs in `f64`; on [`Overflow`][StirlingError::Overflow]
//!    it is retried in log space;
//! 5. the result is written to both tiers.
//!
//! Engines use interior mutability and are not `Sync`: create one per
//! thread, pointing them at the same disk directory if values should be
//! shared (this is what the parallel triangle generator does).
//!
//! # Examples
//!
//! ```
//! use stirling_rs::engine::Engine;
//! use stirling_rs::types::{Method, Params};
//!
//! let engine = Engine::with_params(1.0, 1.0).unwrap();
//! assert_eq!(engine.compute(5, 3).unwrap(), 120.0); // Lah number
//!
//! let second = Engine::new(Params::second_kind(), Default::default());
//! let value = second.compute_with(5, 3, Method::Explicit).unwrap();
//! assert!((value - 25.0).abs() < 1e-9);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::cache::{CacheKey, CacheStats, DiskCache, MemoryCache};
use crate::config::EngineConfig;
use crate::error::{Result, StirlingError};
use crate::numeric::{ln_rising_factorial, rising_factorial, LogValue, Value};
use crate::selector::{is_base_case, select_method};
use crate::types::{Method, Params};

/// Time spent in one strategy.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MethodStats {
    /// Evaluations that were not answered by a cache.
    pub evaluations: usize,
    pub time: Duration,
}

/// Cache counters and per-strategy timings of one engine.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub cache: CacheStats,
    pub methods: BTreeMap<Method, MethodStats>,
}

impl Display for EngineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.cache;
        writeln!(f, "Cache statistics:")?;
        writeln!(f, "  memory: {} hits, {} misses", c.memory_hits, c.memory_misses)?;
        writeln!(
            f,
            "  disk:   {} hits, {} misses, {} writes, {} errors",
            c.disk_hits, c.disk_misses, c.disk_writes, c.disk_errors
        )?;
        writeln!(f, "  hit rate: {:.1}%", 100.0 * c.hit_rate())?;
        writeln!(f, "Per-method statistics:")?;
        for (method, stats) in &self.methods {
            writeln!(
                f,
                "  {:<12} {:>8} evaluations {:>12.6} s",
                method.tag(),
                stats.evaluations,
                stats.time.as_secs_f64()
            )?;
        }
        Ok(())
    }
}

/// Evaluator of `S(n, k; α, β, r)` for one fixed parameter set.
pub struct Engine {
    pub(crate) params: Params,
    pub(crate) config: EngineConfig,
    pub(crate) memory: RefCell<MemoryCache<CacheKey, Value>>,
    disk: Option<DiskCache>,
    stats: RefCell<EngineStats>,
}

impl Engine {
    /// Creates an engine.
    ///
    /// If the configured disk cache directory cannot be opened, the engine
    /// logs a warning and runs memory-only.
    pub fn new(params: Params, config: EngineConfig) -> Self {
        let disk = config
            .disk_cache_dir
            .as_ref()
            .and_then(|dir| match DiskCache::open(dir) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(
                        "disk cache at {} unavailable, continuing memory-only: {}",
                        dir.display(),
                        e
                    );
                    None
                }
            });

        Self {
            params,
            memory: RefCell::new(MemoryCache::new(config.cache_bits)),
            config,
            disk,
            stats: RefCell::new(EngineStats::default()),
        }
    }

    /// Creates a memory-only engine for `S(n,k;α,β)`.
    pub fn with_params(alpha: f64, beta: f64) -> Result<Self> {
        Ok(Self::new(Params::new(alpha, beta)?, EngineConfig::default()))
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn disk_cache(&self) -> Option<&DiskCache> {
        self.disk.as_ref()
    }

    /// Number of values (including memo entries) held in memory.
    pub fn cached_values(&self) -> usize {
        self.memory.borrow().len()
    }

    pub fn stats(&self) -> EngineStats {
        let mut stats = self.stats.borrow().clone();
        let memory = self.memory.borrow();
        stats.cache.memory_hits = memory.hits();
        stats.cache.memory_misses = memory.misses();
        stats
    }

    /// Drops the memory tier. Disk entries are kept.
    pub fn clear_cache(&self) {
        self.memory.borrow_mut().clear();
    }

    /// Removes this engine's entries from the disk tier.
    ///
    /// Returns the number of removed files (zero without a disk cache).
    pub fn clear_disk_cache(&self) -> Result<usize> {
        match &self.disk {
            Some(disk) => disk.clear(Some(&self.params.key())),
            None => Ok(0),
        }
    }

    /// `S(n, k)` with an automatically selected strategy.
    pub fn compute(&self, n: u64, k: u64) -> Result<f64> {
        self.compute_with(n, k, Method::Auto)
    }

    /// `S(n, k)` with the given strategy.
    ///
    /// Fails with [`Overflow`][StirlingError::Overflow] only when the value is
    /// outside the `f64` range even after the log-space retry; use
    /// [`compute_value`][Self::compute_value] to obtain such values.
    pub fn compute_with(&self, n: u64, k: u64, method: Method) -> Result<f64> {
        let value = self.compute_value(n, k, method)?;
        value.to_f64().ok_or_else(|| {
            StirlingError::overflow(format!("S({},{}) = {} as f64", n, k, value))
        })
    }

    /// `S(n, k)` as a [`Value`], which may carry a log-space magnitude.
    pub fn compute_value(&self, n: u64, k: u64, method: Method) -> Result<Value> {
        if is_base_case(n, k) {
            return Ok(self.base_value(n, k));
        }

        let method = match method {
            Method::Auto => {
                let selected = select_method(n, k, &self.params);
                debug!("auto-selected {} for S({},{})", selected, n, k);
                selected
            }
            method => method,
        };

        let key = CacheKey::new(method, n, k, &self.params);
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        let start = Instant::now();
        let value = self.evaluate(method, n, k)?;
        self.record(method, start.elapsed());
        self.store(&key, value);
        Ok(value)
    }

    /// The Stirling measure `(S(n+1,k) - S(n,k-1)) / S(n,k)`.
    ///
    /// By the triangular recurrence it equals `αn + βk + r`; observed
    /// measures feed [`estimate_parameters`][crate::estimate::estimate_parameters].
    pub fn stirling_measure(&self, n: u64, k: u64) -> Result<f64> {
        if k == 0 || k > n {
            return Err(StirlingError::invalid(format!(
                "Stirling measure needs 1 <= k <= n, got n={}, k={}",
                n, k
            )));
        }
        let current = self.compute_value(n, k, Method::Auto)?.to_log();
        if current.is_zero() {
            return Err(StirlingError::invalid(format!(
                "S({},{}) is zero, the measure is undefined",
                n, k
            )));
        }
        let next = self.compute_value(n + 1, k, Method::Auto)?.to_log();
        let left = self.compute_value(n, k - 1, Method::Auto)?.to_log();
        let measure = (next + -left) * current.recip();
        measure
            .to_f64()
            .ok_or_else(|| StirlingError::overflow(format!("Stirling measure at ({},{})", n, k)))
    }

    /// Closed form of a base case as a [`Value`].
    fn base_value(&self, n: u64, k: u64) -> Value {
        match self.base_case(n, k) {
            Ok(Some(v)) => Value::Direct(v),
            _ => Value::Log(self.base_case_log(n, k).unwrap_or(LogValue::ZERO)),
        }
    }

    /// `S(n,k)` for `k = 0` and `k >= n`, `None` otherwise.
    ///
    /// The `k = 0` column is `(r|α)^n̄`, which is `0` for `n > 0` when `r = 0`.
    pub(crate) fn base_case(&self, n: u64, k: u64) -> Result<Option<f64>> {
        if k > n {
            Ok(Some(0.0))
        } else if k == n {
            Ok(Some(1.0))
        } else if k == 0 {
            rising_factorial(self.params.r(), n, self.params.alpha()).map(Some)
        } else {
            Ok(None)
        }
    }

    pub(crate) fn base_case_log(&self, n: u64, k: u64) -> Option<LogValue> {
        if k > n {
            Some(LogValue::ZERO)
        } else if k == n {
            Some(LogValue::ONE)
        } else if k == 0 {
            Some(ln_rising_factorial(self.params.r(), n, self.params.alpha()))
        } else {
            None
        }
    }

    fn evaluate(&self, method: Method, n: u64, k: u64) -> Result<Value> {
        if self.prefers_log(method, n, k) {
            return self.evaluate_log(method, n, k).map(Value::Log);
        }
        match self.evaluate_direct(method, n, k) {
            Ok(v) => Ok(Value::Direct(v)),
            Err(e) if e.is_overflow() => {
                debug!("{} overflowed for S({},{}), retrying in log space", method, n, k);
                self.evaluate_log(method, n, k).map(Value::Log)
            }
            Err(e) => Err(e),
        }
    }

    fn prefers_log(&self, method: Method, n: u64, k: u64) -> bool {
        let (max_n, max_k) = self.config.explicit_direct_limit;
        match method {
            Method::Explicit => n > max_n || k > max_k,
            Method::SingleList => n > self.config.single_list_direct_limit,
            _ => false,
        }
    }

    fn evaluate_direct(&self, method: Method, n: u64, k: u64) -> Result<f64> {
        match method {
            Method::Auto => self.evaluate_direct(select_method(n, k, &self.params), n, k),
            Method::Triangular => self.triangular(n, k),
            Method::BottomUp => self.bottom_up(n, k),
            Method::Explicit => self.explicit(n, k),
            Method::Horizontal => self.horizontal(n, k),
            Method::Vertical => self.vertical(n, k),
            Method::Symmetric => self.symmetric(n, k),
            Method::SingleList => self.single_list(n, k),
        }
    }

    fn evaluate_log(&self, method: Method, n: u64, k: u64) -> Result<LogValue> {
        match method {
            Method::Explicit => self.explicit_log(n, k),
            Method::SingleList => self.single_list_log(n, k),
            _ => Ok(self.bottom_up_log(n, k)),
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<Value> {
        if let Some(value) = self.memory.borrow_mut().get(key) {
            return Some(value);
        }

        let disk = self.disk.as_ref()?;
        let loaded = disk.load(key);
        let mut stats = self.stats.borrow_mut();
        match loaded {
            Ok(Some(value)) => {
                stats.cache.disk_hits += 1;
                drop(stats);
                self.memory.borrow_mut().insert(*key, value);
                Some(value)
            }
            Ok(None) => {
                stats.cache.disk_misses += 1;
                None
            }
            Err(e) => {
                warn!("disk cache read failed for {}: {}", key, e);
                stats.cache.disk_errors += 1;
                None
            }
        }
    }

    fn store(&self, key: &CacheKey, value: Value) {
        self.memory.borrow_mut().insert(*key, value);

        if let Some(disk) = &self.disk {
            let mut stats = self.stats.borrow_mut();
            match disk.store(key, value) {
                Ok(()) => stats.cache.disk_writes += 1,
                Err(e) => {
                    warn!("disk cache write failed for {}: {}", key, e);
                    stats.cache.disk_errors += 1;
                }
            }
        }
    }

    fn record(&self, method: Method, elapsed: Duration) {
        let mut stats = self.stats.borrow_mut();
        let entry = stats.methods.entry(method).or_default();
        entry.evaluations += 1;
        entry.time += elapsed;
    }
}

impl Default for Engine {
    /// A memory-only engine for Lah numbers.
    fn default() -> Self {
        Engine::new(Params::lah(), EngineConfig::default())
    }
}

impl Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("params", &self.params)
            .field("cached_values", &self.cached_values())
            .field("disk_cache", &self.disk.as_ref().map(|d| d.dir()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::numeric::approx_eq;

    #[test]
    fn test_known_values() {
        let first = Engine::new(Params::first_kind(), EngineConfig::default());
        let second = Engine::new(Params::second_kind(), EngineConfig::default());
        let lah = Engine::new(Params::lah(), EngineConfig::default());

        assert_eq!(first.compute(5, 3).unwrap(), 35.0);
        assert_eq!(second.compute(5, 3).unwrap(), 25.0);
        assert_eq!(lah.compute(5, 3).unwrap(), 120.0);

        assert_eq!(first.compute(4, 2).unwrap(), 11.0);
        assert_eq!(second.compute(4, 2).unwrap(), 7.0);
        assert_eq!(lah.compute(4, 2).unwrap(), 36.0);
    }

    #[test]
    fn test_base_cases() {
        for params in [Params::first_kind(), Params::second_kind(), Params::lah()] {
            let engine = Engine::new(params, EngineConfig::default());
            assert_eq!(engine.compute(0, 0).unwrap(), 1.0);
            for n in 1..10 {
                assert_eq!(engine.compute(n, 0).unwrap(), 0.0);
                assert_eq!(engine.compute(n, n).unwrap(), 1.0);
                assert_eq!(engine.compute(n, n + 1).unwrap(), 0.0);
                assert_eq!(engine.compute(n, n + 7).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_shifted_zero_column() {
        // S(n,0) = (r|α)^n̄ = r (r + α) ... (r + (n-1)α)
        let engine = Engine::new(
            Params::with_shift(1.0, 1.0, 2.0).unwrap(),
            EngineConfig::default(),
        );
        assert_eq!(engine.compute(3, 0).unwrap(), 2.0 * 3.0 * 4.0);
    }

    #[test]
    fn test_idempotent_caching() {
        let engine = Engine::with_params(0.5, 0.7).unwrap();
        let a = engine.compute(18, 7).unwrap();
        let b = engine.compute(18, 7).unwrap();
        assert_eq!(a, b);
        assert!(engine.stats().cache.memory_hits >= 1);

        engine.clear_cache();
        assert_eq!(engine.cached_values(), 0);
        let c = engine.compute(18, 7).unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn test_stats_record_evaluations() {
        let engine = Engine::default();
        engine.compute_with(10, 4, Method::BottomUp).unwrap();
        engine.compute_with(10, 4, Method::BottomUp).unwrap();
        engine.compute_with(10, 4, Method::Explicit).unwrap();

        let stats = engine.stats();
        assert_eq!(stats.methods[&Method::BottomUp].evaluations, 1);
        assert_eq!(stats.methods[&Method::Explicit].evaluations, 1);
        assert_eq!(stats.cache.memory_hits, 1);
        assert!(stats.to_string().contains("bottom_up"));
    }

    #[test]
    fn test_overflow_falls_back_to_log_space() {
        let engine = Engine::default();
        // Lah numbers L(400, 2) are around 400! / 2 and do not fit an f64.
        let value = engine.compute_value(400, 2, Method::BottomUp).unwrap();
        assert!(value.is_log());
        assert!(matches!(
            engine.compute_with(400, 2, Method::BottomUp),
            Err(StirlingError::Overflow(_))
        ));

        // L(n,k) = C(n-1, k-1) n! / k!
        let expected = crate::numeric::ln_binomial(399, 1).unwrap()
            + crate::numeric::ln_factorial(400)
            - crate::numeric::ln_factorial(2);
        assert!(approx_eq(value.to_log().ln_abs(), expected, 1e-10));
    }

    #[test]
    fn test_stirling_measure() {
        let engine = Engine::with_params(0.3, 0.7).unwrap();
        for (n, k) in [(5, 2), (9, 4), (12, 12), (20, 3)] {
            let measure = engine.stirling_measure(n, k).unwrap();
            assert!(approx_eq(measure, 0.3 * n as f64 + 0.7 * k as f64, 1e-9));
        }
        assert!(engine.stirling_measure(3, 0).is_err());
        assert!(engine.stirling_measure(3, 4).is_err());
    }

    #[test]
    fn test_unwritable_disk_cache_degrades() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let engine = Engine::new(Params::lah(), EngineConfig::default().with_disk_cache(&file));
        assert!(engine.disk_cache().is_none());
        assert_eq!(engine.compute(5, 3).unwrap(), 120.0);
    }
}
