//! Partial and complete Bell polynomials.
//!
//! The partial Bell polynomial `B_{n,k}(x_1, ..., x_{n-k+1})` sums
//! `x_{j_1} ... x_{j_k}` weighted by the number of ways to split `n`
//! labelled elements into `k` blocks of sizes `j_1, ..., j_k`. It satisfies
//!
//! ```text
//! B_{n,k} = Σ_{i=1}^{n-k+1} C(n-1, i-1) x_i B_{n-i,k-1},    B_{0,0} = 1
//! ```
//!
//! which is tabulated here column by column. For `r = 0` the generalized
//! Stirling numbers are the partial Bell polynomials of their own first
//! column, `S(n,k) = B_{n,k}(S(1,1), S(2,1), ...)`; see
//! [`Engine::bell_coefficients`].
//!
//! Coefficients missing from the end of `x` are read as zero.
//!
//! ```
//! use stirling_rs::bell::{complete_bell, partial_bell};
//!
//! let ones = [1.0; 8];
//! assert_eq!(partial_bell(5, 2, &ones).unwrap(), 15.0); // S2(5,2)
//! assert_eq!(complete_bell(6, &ones).unwrap(), 203.0); // Bell number
//! ```

use crate::engine::Engine;
use crate::error::{Result, StirlingError};
use crate::numeric::{binomial, rising_factorial};

fn coefficient(x: &[f64], i: u64) -> f64 {
    x.get(i as usize - 1).copied().unwrap_or(0.0)
}

fn finite(value: f64, what: impl FnOnce() -> String) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StirlingError::overflow(what()))
    }
}

/// Partial Bell polynomial `B_{n,k}(x_1, ..., x_{n-k+1})`.
pub fn partial_bell(n: u64, k: u64, x: &[f64]) -> Result<f64> {
    if n == 0 && k == 0 {
        return Ok(1.0);
    }
    if k == 0 || k > n {
        return Ok(0.0);
    }

    // prev[m] = B_{m, j-1}; only rows m <= n - (k - j) feed B_{n,k}
    let size = n as usize + 1;
    let mut prev = vec![0.0; size];
    prev[0] = 1.0;
    for j in 1..=k {
        let mut cur = vec![0.0; size];
        for m in j..=n - (k - j) {
            let mut sum = 0.0;
            for i in 1..=m - j + 1 {
                let x_i = coefficient(x, i);
                if x_i != 0.0 {
                    sum += binomial(m - 1, i - 1)? * x_i * prev[(m - i) as usize];
                }
            }
            cur[m as usize] = sum;
        }
        prev = cur;
    }
    finite(prev[n as usize], || format!("partial Bell polynomial B({},{})", n, k))
}

/// Complete Bell polynomial `B_n(x_1, ..., x_n) = Σ_k B_{n,k}`.
///
/// Evaluated with `B_{m+1} = Σ_{i=0}^{m} C(m, i) x_{i+1} B_{m-i}`.
pub fn complete_bell(n: u64, x: &[f64]) -> Result<f64> {
    let mut bell = Vec::with_capacity(n as usize + 1);
    bell.push(1.0);
    for m in 0..n {
        let mut sum = 0.0;
        for i in 0..=m {
            let x_i = coefficient(x, i + 1);
            if x_i != 0.0 {
                sum += binomial(m, i)? * x_i * bell[(m - i) as usize];
            }
        }
        bell.push(finite(sum, || format!("complete Bell polynomial B({})", m + 1))?);
    }
    Ok(bell[n as usize])
}

impl Engine {
    /// First column `S(1,1), ..., S(len,1)` of the unshifted family.
    ///
    /// These are the coefficients `x_i = (α+β)(2α+β)...((i-1)α+β)` for which
    /// `S(n,k) = B_{n,k}(x_1, x_2, ...)`.
    pub fn bell_coefficients(&self, len: u64) -> Result<Vec<f64>> {
        if !self.params.is_unshifted() {
            return Err(StirlingError::invalid(
                "Bell polynomial form requires r = 0",
            ));
        }
        let (alpha, beta) = (self.params.alpha(), self.params.beta());
        (0..len)
            .map(|i| rising_factorial(alpha + beta, i, alpha))
            .collect()
    }
}
