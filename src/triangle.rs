//! Whole-triangle generation.
//!
//! [`Engine::generate_triangle`] walks rows `0..=n_max` in order on one
//! engine, so the triangular memo is reused from entry to entry.
//! [`generate_triangle_parallel`] deals the `(n, k)` pairs round-robin to a
//! number of partitions and evaluates each partition on the rayon pool with
//! its own engine. Partitions share nothing but the disk cache directory.
//! [`Engine::iter_triangle`] yields entries lazily for callers that do not
//! want the whole table in memory.

use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{Result, StirlingError};
use crate::types::Params;

/// A triangle of values `S(n, k)` for `0 <= k <= n <= n_max`.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    /// Row `n` holds columns `0..=n`.
    Dense(Vec<Vec<f64>>),
    /// Nonzero entries only.
    Sparse {
        n_max: u64,
        entries: BTreeMap<(u64, u64), f64>,
    },
}

impl Table {
    fn from_entries(
        n_max: u64,
        sparse: bool,
        entries: impl IntoIterator<Item = (u64, u64, f64)>,
    ) -> Self {
        if sparse {
            let entries = entries
                .into_iter()
                .filter(|&(_, _, v)| v != 0.0)
                .map(|(n, k, v)| ((n, k), v))
                .collect();
            Table::Sparse { n_max, entries }
        } else {
            let mut rows: Vec<Vec<f64>> = (0..=n_max).map(|n| vec![0.0; n as usize + 1]).collect();
            for (n, k, v) in entries {
                rows[n as usize][k as usize] = v;
            }
            Table::Dense(rows)
        }
    }

    pub fn n_max(&self) -> u64 {
        match self {
            Table::Dense(rows) => rows.len().saturating_sub(1) as u64,
            Table::Sparse { n_max, .. } => *n_max,
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Table::Sparse { .. })
    }

    /// `S(n, k)`, or `None` for rows past `n_max`. Entries with `k > n` are zero.
    pub fn get(&self, n: u64, k: u64) -> Option<f64> {
        if n > self.n_max() {
            return None;
        }
        if k > n {
            return Some(0.0);
        }
        match self {
            Table::Dense(rows) => Some(rows[n as usize][k as usize]),
            Table::Sparse { entries, .. } => Some(entries.get(&(n, k)).copied().unwrap_or(0.0)),
        }
    }

    /// Number of nonzero entries.
    pub fn nonzero(&self) -> usize {
        match self {
            Table::Dense(rows) => rows.iter().flatten().filter(|&&v| v != 0.0).count(),
            Table::Sparse { entries, .. } => entries.len(),
        }
    }

    /// Converts to the dense layout.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..=self.n_max())
            .map(|n| (0..=n).map(|k| self.get(n, k).unwrap_or(0.0)).collect())
            .collect()
    }
}

impl Engine {
    /// Computes every `S(n, k)` with `0 <= k <= n <= n_max`.
    pub fn generate_triangle(&self, n_max: u64, sparse: bool) -> Result<Table> {
        let start = Instant::now();
        let entries = self.iter_triangle(n_max).collect::<Result<Vec<_>>>()?;
        let table = Table::from_entries(n_max, sparse, entries);
        info!(
            "generated triangle up to n={} ({} nonzero entries) in {:.3?}",
            n_max,
            table.nonzero(),
            start.elapsed()
        );
        Ok(table)
    }

    /// Lazy row-major iterator over `(n, k, S(n, k))` for `0 <= k <= n <= n_max`.
    pub fn iter_triangle(&self, n_max: u64) -> TriangleIter<'_> {
        TriangleIter {
            engine: self,
            n_max,
            n: 0,
            k: 0,
        }
    }
}

/// Iterator returned by [`Engine::iter_triangle`].
pub struct TriangleIter<'a> {
    engine: &'a Engine,
    n_max: u64,
    n: u64,
    k: u64,
}

impl Iterator for TriangleIter<'_> {
    type Item = Result<(u64, u64, f64)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.n > self.n_max {
            return None;
        }
        let (n, k) = (self.n, self.k);
        if k == n {
            self.n += 1;
            self.k = 0;
        } else {
            self.k += 1;
        }
        Some(self.engine.compute(n, k).map(|v| (n, k, v)))
    }
}

/// Computes the triangle up to `n_max` on the rayon pool.
///
/// The `(n, k)` pairs are dealt round-robin to `workers` partitions, each
/// evaluated by a fresh engine built from `params` and `config`. With a disk
/// cache configured, partitions see each other's results through it.
pub fn generate_triangle_parallel(
    params: Params,
    config: &EngineConfig,
    n_max: u64,
    workers: usize,
    sparse: bool,
) -> Result<Table> {
    if workers == 0 {
        return Err(StirlingError::invalid("at least one worker is required"));
    }

    let start = Instant::now();
    let pairs: Vec<(u64, u64)> = (0..=n_max).flat_map(|n| (0..=n).map(move |k| (n, k))).collect();

    let partitions: Vec<Vec<(u64, u64, f64)>> = (0..workers)
        .into_par_iter()
        .map(|worker| -> Result<Vec<(u64, u64, f64)>> {
            let engine = Engine::new(params, config.clone());
            let results = pairs
                .iter()
                .skip(worker)
                .step_by(workers)
                .map(|&(n, k)| engine.compute(n, k).map(|v| (n, k, v)))
                .collect::<Result<Vec<_>>>()?;
            debug!("worker {} computed {} entries", worker, results.len());
            Ok(results)
        })
        .collect::<Result<_>>()?;

    let table = Table::from_entries(n_max, sparse, partitions.into_iter().flatten());
    info!(
        "generated triangle up to n={} with {} workers ({} nonzero entries) in {:.3?}",
        n_max,
        workers,
        table.nonzero(),
        start.elapsed()
    );
    Ok(table)
}
