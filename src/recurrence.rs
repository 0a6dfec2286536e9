//! Evaluation strategies for `S(n, k)`.
//!
//! All of them realize the same numbers,
//!
//! ```text
//! S(n, k) = S(n-1, k-1) + (α(n-1) + βk + r) S(n-1, k)
//! ```
//!
//! but trade memory, time and numerical behaviour differently. None of them
//! recurses on the host stack. The functions here are called by
//! [`Engine::compute_value`] after base cases have been answered, so they
//! may assume `0 < k < n`.

use log::{debug, warn};

use crate::cache::CacheKey;
use crate::engine::Engine;
use crate::error::{Result, StirlingError};
use crate::numeric::{
    binomial, ln_binomial, ln_factorial, ln_rising_factorial, rising_factorial, LogSum, LogValue,
    Value,
};
use crate::types::Method;

impl Engine {
    /// Memoized triangular recurrence driven by an explicit worklist.
    ///
    /// Intermediate values are kept in the memory cache under the
    /// triangular tag, so later requests reuse them.
    pub(crate) fn triangular(&self, n: u64, k: u64) -> Result<f64> {
        if n > self.config.max_recursion_depth {
            debug!(
                "S({},{}) is deeper than {} rows, using bottom-up",
                n, k, self.config.max_recursion_depth
            );
            return self.bottom_up(n, k);
        }

        let mut stack = vec![(n, k)];
        while let Some(&(i, j)) = stack.last() {
            if self.triangular_known(i, j)?.is_some() {
                stack.pop();
                continue;
            }
            let left = self.triangular_known(i - 1, j - 1)?;
            let up = self.triangular_known(i - 1, j)?;
            match (left, up) {
                (Some(left), Some(up)) => {
                    let value = left + self.params.weight(i, j) * up;
                    if !value.is_finite() {
                        return Err(StirlingError::overflow(format!("triangular S({},{})", i, j)));
                    }
                    let key = CacheKey::new(Method::Triangular, i, j, &self.params);
                    self.memory.borrow_mut().insert(key, Value::Direct(value));
                    stack.pop();
                }
                (left, up) => {
                    if left.is_none() {
                        stack.push((i - 1, j - 1));
                    }
                    if up.is_none() {
                        stack.push((i - 1, j));
                    }
                }
            }
        }

        self.triangular_known(n, k)?
            .ok_or_else(|| StirlingError::overflow(format!("triangular S({},{})", n, k)))
    }

    fn triangular_known(&self, n: u64, k: u64) -> Result<Option<f64>> {
        if let Some(value) = self.base_case(n, k)? {
            return Ok(Some(value));
        }
        let key = CacheKey::new(Method::Triangular, n, k, &self.params);
        Ok(self.memory.borrow().peek(&key).and_then(|v| v.to_f64()))
    }

    /// Row-by-row recurrence keeping only `k + 1` columns.
    pub(crate) fn bottom_up(&self, n: u64, k: u64) -> Result<f64> {
        let row = self.bottom_up_row(n, k)?;
        Ok(row[k as usize])
    }

    /// Row `n` of the triangle, columns `0..=max_k`.
    pub(crate) fn bottom_up_row(&self, n: u64, max_k: u64) -> Result<Vec<f64>> {
        let mut row = vec![0.0; max_k as usize + 1];
        row[0] = 1.0;
        for i in 1..=n {
            for j in (1..=i.min(max_k)).rev() {
                let j_ = j as usize;
                row[j_] = row[j_ - 1] + self.params.weight(i, j) * row[j_];
            }
            row[0] *= self.params.weight(i, 0);
            if row.iter().any(|x| !x.is_finite()) {
                return Err(StirlingError::overflow(format!("bottom-up row {}", i)));
            }
        }
        Ok(row)
    }

    /// Column `k` for rows `0..=n_max`.
    pub(crate) fn bottom_up_column(&self, n_max: u64, k: u64) -> Result<Vec<f64>> {
        let mut row = vec![0.0; k as usize + 1];
        row[0] = 1.0;
        let mut column = Vec::with_capacity(n_max as usize + 1);
        column.push(row[k as usize]);
        for i in 1..=n_max {
            for j in (1..=i.min(k)).rev() {
                let j_ = j as usize;
                row[j_] = row[j_ - 1] + self.params.weight(i, j) * row[j_];
            }
            row[0] *= self.params.weight(i, 0);
            if row.iter().any(|x| !x.is_finite()) {
                return Err(StirlingError::overflow(format!("bottom-up row {}", i)));
            }
            column.push(row[k as usize]);
        }
        Ok(column)
    }

    /// Bottom-up over [`LogValue`]s; never overflows.
    pub(crate) fn bottom_up_log(&self, n: u64, k: u64) -> LogValue {
        let mut row = vec![LogValue::ZERO; k as usize + 1];
        row[0] = LogValue::ONE;
        for i in 1..=n {
            for j in (1..=i.min(k)).rev() {
                let j_ = j as usize;
                row[j_] = row[j_ - 1] + row[j_] * self.params.weight(i, j);
            }
            row[0] = row[0] * self.params.weight(i, 0);
        }
        row[k as usize]
    }

    /// Explicit alternating sum
    /// `S(n,k) = 1/(β^k k!) Σ_j (-1)^j C(k,j) (β(k-j) + r | α)^n̄`.
    ///
    /// Undefined for `β = 0`. Reports [`PrecisionLoss`][StirlingError::PrecisionLoss]
    /// when cancellation pushes the estimated error past the configured tolerance.
    pub(crate) fn explicit(&self, n: u64, k: u64) -> Result<f64> {
        let (alpha, beta, r) = self.explicit_params()?;

        let mut sum = 0.0;
        let mut magnitude = 0.0;
        for j in 0..=k {
            let term = binomial(k, j)? * rising_factorial(beta * (k - j) as f64 + r, n, alpha)?;
            magnitude += term.abs();
            sum += if j % 2 == 0 { term } else { -term };
        }
        if !sum.is_finite() || !magnitude.is_finite() {
            return Err(StirlingError::overflow(format!("explicit sum for S({},{})", n, k)));
        }
        let ratio = if magnitude > 0.0 { sum.abs() / magnitude } else { 1.0 };
        self.check_cancellation("explicit", n, k, ratio, 0.0)?;

        let denominator = beta.powi(k as i32) * (1..=k).map(|i| i as f64).product::<f64>();
        let value = sum / denominator;
        if denominator == 0.0 || !denominator.is_finite() || !value.is_finite() {
            return Err(StirlingError::overflow(format!("explicit S({},{})", n, k)));
        }
        Ok(value)
    }

    /// Log-space form of [`explicit`][Self::explicit] built on [`LogSum`].
    pub(crate) fn explicit_log(&self, n: u64, k: u64) -> Result<LogValue> {
        let (alpha, beta, r) = self.explicit_params()?;

        let mut sum = LogSum::new();
        let mut ln_scale = 0f64;
        for j in 0..=k {
            let coefficient = LogValue::new(ln_binomial(k, j)?, if j % 2 == 0 { 1 } else { -1 });
            let term = coefficient * ln_rising_factorial(beta * (k - j) as f64 + r, n, alpha);
            if !term.is_zero() {
                ln_scale = ln_scale.max(term.ln_abs().abs());
            }
            sum.push(term);
        }
        self.check_cancellation("explicit", n, k, sum.cancellation_ratio(), ln_scale)?;

        let beta_sign = if beta < 0.0 && k % 2 == 1 { -1 } else { 1 };
        let denominator = LogValue::new(k as f64 * beta.abs().ln() + ln_factorial(k), beta_sign);
        Ok(sum.total() * denominator.recip())
    }

    fn explicit_params(&self) -> Result<(f64, f64, f64)> {
        let beta = self.params.beta();
        if beta == 0.0 {
            return Err(StirlingError::invalid(
                "explicit formula is undefined for beta = 0",
            ));
        }
        Ok((self.params.alpha(), beta, self.params.r()))
    }

    /// Rejects an alternating sum whose estimated relative error exceeds
    /// `max_relative_error`.
    ///
    /// Each term is a product of about `n + k` rounded factors and costs a
    /// few ε per factor; a term that went through log space also carries
    /// `ε |ln term|` (`ln_scale`). Cancellation amplifies that by `1 / ratio`.
    fn check_cancellation(
        &self,
        what: &str,
        n: u64,
        k: u64,
        ratio: f64,
        ln_scale: f64,
    ) -> Result<()> {
        let estimated_error = f64::EPSILON * ((4 * (n + k)) as f64 + ln_scale) / ratio;
        if estimated_error > self.config.max_relative_error {
            warn!(
                "{} sum for S({},{}) lost precision (cancellation ratio {:e}, estimated error {:e})",
                what, n, k, ratio, estimated_error
            );
            return Err(StirlingError::PrecisionLoss {
                n,
                k,
                ratio,
                estimated_error,
            });
        }
        Ok(())
    }

    /// Horizontal identity over row `n + 1`:
    /// `S(n,k) = Σ_{j=0}^{n-k} (-1)^j ((k+1)β + nα + r | β)^j̄ S(n+1, k+j+1)`.
    ///
    /// The sum alternates and cancels badly for small `k`, so it goes through
    /// the same precision check as the explicit formula.
    pub(crate) fn horizontal(&self, n: u64, k: u64) -> Result<f64> {
        let row = self.bottom_up_row(n + 1, n + 1)?;
        let beta = self.params.beta();
        let base = (k + 1) as f64 * beta + n as f64 * self.params.alpha() + self.params.r();

        let mut sum = 0.0;
        let mut magnitude = 0.0;
        for j in 0..=n - k {
            let term = rising_factorial(base, j, beta)? * row[(k + j + 1) as usize];
            magnitude += term.abs();
            sum += if j % 2 == 0 { term } else { -term };
        }
        if !sum.is_finite() || !magnitude.is_finite() {
            return Err(StirlingError::overflow(format!("horizontal S({},{})", n, k)));
        }
        let ratio = if magnitude > 0.0 { sum.abs() / magnitude } else { 1.0 };
        self.check_cancellation("horizontal", n, k, ratio, 0.0)?;
        Ok(sum)
    }

    /// Vertical identity over column `k - 1`:
    /// `S(n,k) = Σ_{i=k-1}^{n-1} (α+β | α)^(n-1-i) C(n-1,i) S(i,k-1)`.
    ///
    /// Only valid for the unshifted family.
    pub(crate) fn vertical(&self, n: u64, k: u64) -> Result<f64> {
        if !self.params.is_unshifted() {
            return Err(StirlingError::invalid(
                "vertical recurrence requires r = 0",
            ));
        }
        let column = self.bottom_up_column(n - 1, k - 1)?;
        let alpha = self.params.alpha();
        let step = alpha + self.params.beta();

        let mut sum = 0.0;
        for i in k - 1..n {
            sum += rising_factorial(step, n - 1 - i, alpha)? * binomial(n - 1, i)? * column[i as usize];
        }
        if sum.is_finite() {
            Ok(sum)
        } else {
            Err(StirlingError::overflow(format!("vertical S({},{})", n, k)))
        }
    }

    /// Near-diagonal form `S(m+d, m) = Σ_{0≤i₁≤…≤i_d≤m} ∏_j ((α+β)i_j + α(j-1) + r)`.
    ///
    /// The nested sum is tabulated from the innermost index outwards with
    /// suffix sums, in `O(d·m)` time.
    pub(crate) fn symmetric(&self, n: u64, k: u64) -> Result<f64> {
        let (m, d) = (k as usize, n - k);
        let slope = self.params.alpha() + self.params.beta();

        // inner[i]: sum over the remaining indices given the current one is >= i
        let mut inner = vec![1.0; m + 1];
        let mut outer = vec![0.0; m + 2];
        for depth in (0..d).rev() {
            let offset = self.params.alpha() * depth as f64 + self.params.r();
            outer[m + 1] = 0.0;
            for i in (0..=m).rev() {
                outer[i] = (slope * i as f64 + offset) * inner[i] + outer[i + 1];
            }
            inner.copy_from_slice(&outer[..=m]);
        }

        if inner[0].is_finite() {
            Ok(inner[0])
        } else {
            Err(StirlingError::overflow(format!("symmetric S({},{})", n, k)))
        }
    }

    /// Closed form for the first column, `S(n,1) = ∏_{j=1}^{n-1} (jα + β)`.
    pub(crate) fn single_list(&self, n: u64, k: u64) -> Result<f64> {
        self.single_list_check(k)?;
        rising_factorial(self.params.alpha() + self.params.beta(), n - 1, self.params.alpha())
    }

    pub(crate) fn single_list_log(&self, n: u64, k: u64) -> Result<LogValue> {
        self.single_list_check(k)?;
        Ok(ln_rising_factorial(
            self.params.alpha() + self.params.beta(),
            n - 1,
            self.params.alpha(),
        ))
    }

    fn single_list_check(&self, k: u64) -> Result<()> {
        if k != 1 {
            return Err(StirlingError::invalid(format!(
                "single-list closed form needs k = 1, got k = {}",
                k
            )));
        }
        if !self.params.is_unshifted() {
            return Err(StirlingError::invalid(
                "single-list closed form requires r = 0",
            ));
        }
        Ok(())
    }
}
