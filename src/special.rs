//! Classical families as special cases of `S(n,k;α,β,r)`.
//!
//! | Family | L-notation `(α, β, r)` |
//! |--------|------------------------|
//! | Stirling, first kind (unsigned) | `(1, 0, 0)` |
//! | Stirling, second kind | `(0, 1, 0)` |
//! | Lah | `(1, 1, 0)` |
//! | r-Stirling, first kind | `(1, 0, r)` |
//! | r-Stirling, second kind | `(0, 1, r)` |
//! | Whitney, first kind | `(m, 0, 0)`, signed by `(-1)^(n-k)` |
//! | Whitney, second kind | `(0, m, 0)` |
//!
//! The r-Stirling numbers are indexed by the free elements: entry `(n, k)`
//! counts arrangements of `n + r` elements into `k + r` blocks (cycles or
//! subsets) with the first `r` elements in distinct blocks.
//!
//! Each function builds a throwaway memory-only engine; keep an [`Engine`]
//! around instead when evaluating many entries of one family.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::types::Params;

fn evaluate(params: Params, n: u64, k: u64) -> Result<f64> {
    Engine::new(params, EngineConfig::default()).compute(n, k)
}

/// Unsigned Stirling number of the first kind `[n, k]`.
pub fn stirling_first_kind(n: u64, k: u64) -> Result<f64> {
    evaluate(Params::first_kind(), n, k)
}

/// Stirling number of the second kind `{n, k}`.
pub fn stirling_second_kind(n: u64, k: u64) -> Result<f64> {
    evaluate(Params::second_kind(), n, k)
}

/// Unsigned Lah number `L(n, k)`.
pub fn lah_number(n: u64, k: u64) -> Result<f64> {
    evaluate(Params::lah(), n, k)
}

pub fn r_stirling_first_kind(n: u64, k: u64, r: f64) -> Result<f64> {
    evaluate(Params::with_shift(1.0, 0.0, r)?, n, k)
}

pub fn r_stirling_second_kind(n: u64, k: u64, r: f64) -> Result<f64> {
    evaluate(Params::with_shift(0.0, 1.0, r)?, n, k)
}

/// Whitney number of the first kind of the Dowling lattice `Q_n(G)` with `|G| = m`.
pub fn whitney_first_kind(n: u64, k: u64, m: f64) -> Result<f64> {
    let unsigned = evaluate(Params::new(m, 0.0)?, n, k)?;
    Ok(if (n - k.min(n)) % 2 == 0 { unsigned } else { -unsigned })
}

/// Whitney number of the second kind of the Dowling lattice `Q_n(G)` with `|G| = m`.
pub fn whitney_second_kind(n: u64, k: u64, m: f64) -> Result<f64> {
    evaluate(Params::new(0.0, m)?, n, k)
}
