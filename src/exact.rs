//! Exact evaluation for integer parameters.
//!
//! When `α`, `β` and `r` are all integers every entry of the triangle is an
//! integer, and the bottom-up recurrence can run over [`BigInt`] without any
//! rounding. This is much slower than the floating strategies but serves as
//! ground truth for them.

use log::debug;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::engine::Engine;
use crate::error::{Result, StirlingError};
use crate::types::Params;

fn integral(name: &str, x: f64) -> Result<i64> {
    if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Ok(x as i64)
    } else {
        Err(StirlingError::invalid(format!(
            "exact evaluation needs integer parameters, {} = {}",
            name, x
        )))
    }
}

/// Row `n` of the triangle as exact integers, columns `0..=n`.
pub fn exact_triangle_row(params: &Params, n: u64) -> Result<Vec<BigInt>> {
    let alpha = integral("alpha", params.alpha())?;
    let beta = integral("beta", params.beta())?;
    let r = integral("r", params.r())?;

    let weight = |i: u64, j: u64| -> BigInt {
        BigInt::from(alpha) * (i - 1) + BigInt::from(beta) * j + r
    };

    let mut row = vec![BigInt::zero(); n as usize + 1];
    row[0] = BigInt::from(1);
    for i in 1..=n {
        for j in (1..=i).rev() {
            let j_ = j as usize;
            let stay = &row[j_] * weight(i, j);
            row[j_] = &row[j_ - 1] + stay;
        }
        row[0] = &row[0] * weight(i, 0);
    }
    debug!("exact row {} for {}", n, params);
    Ok(row)
}

impl Engine {
    /// `S(n, k)` as an exact integer; requires integral `α`, `β` and `r`.
    pub fn compute_exact(&self, n: u64, k: u64) -> Result<BigInt> {
        if k > n {
            return Ok(BigInt::zero());
        }
        let mut row = exact_triangle_row(&self.params, n)?;
        Ok(row.swap_remove(k as usize))
    }

    /// Relative difference between the floating and the exact value of `S(n, k)`.
    pub fn exact_relative_error(&self, n: u64, k: u64) -> Result<f64> {
        let exact = self.compute_exact(n, k)?;
        let value = self.compute(n, k)?;
        let reference = exact
            .to_f64()
            .ok_or_else(|| StirlingError::overflow(format!("exact S({},{}) as f64", n, k)))?;
        if reference == 0.0 {
            Ok(value.abs())
        } else {
            Ok(((value - reference) / reference).abs())
        }
    }
}
