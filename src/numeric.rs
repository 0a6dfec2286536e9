//! Numeric primitives: factorial-style products, binomials and signed log values.
//!
//! Generalized Stirling numbers grow faster than factorials, so most formulas
//! here come in two flavours: a direct `f64` form that reports
//! [`Overflow`][StirlingError::Overflow] instead of returning an infinity, and
//! a log-space form built on [`LogValue`] that is always representable.
//!
//! # Log-space sums
//!
//! The explicit formula is an alternating sum. [`LogSum`] accumulates the
//! positive and negative parts separately with a running log-sum-exp and
//! reports how much of the magnitude cancelled:
//!
//! ```
//! use stirling_rs::numeric::{LogSum, LogValue};
//!
//! let mut sum = LogSum::new();
//! sum.push(LogValue::from_f64(243.0)); // 3^5
//! sum.push(LogValue::from_f64(-96.0)); // -3 * 2^5
//! sum.push(LogValue::from_f64(3.0)); // 3 * 1^5
//! let total = sum.total().to_f64().unwrap();
//! assert!((total - 150.0).abs() < 1e-9); // 3! * S(5,3)
//! ```

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Neg};

use crate::error::{Result, StirlingError};

/// Products with at most this many factors are multiplied directly.
pub const DIRECT_TERMS: u64 = 20;

/// A real number stored as `sign * exp(ln_abs)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LogValue {
    ln_abs: f64,
    sign: i8,
}

impl LogValue {
    pub const ZERO: LogValue = LogValue {
        ln_abs: f64::NEG_INFINITY,
        sign: 0,
    };
    pub const ONE: LogValue = LogValue { ln_abs: 0.0, sign: 1 };

    pub fn new(ln_abs: f64, sign: i8) -> Self {
        if sign == 0 || ln_abs == f64::NEG_INFINITY {
            Self::ZERO
        } else {
            Self {
                ln_abs,
                sign: sign.signum(),
            }
        }
    }

    pub fn from_f64(x: f64) -> Self {
        if x == 0.0 {
            Self::ZERO
        } else {
            Self::new(x.abs().ln(), if x < 0.0 { -1 } else { 1 })
        }
    }

    /// Natural logarithm of the magnitude (`-inf` for zero).
    pub fn ln_abs(&self) -> f64 {
        self.ln_abs
    }

    /// Sign as `-1`, `0` or `+1`.
    pub fn sign(&self) -> i8 {
        self.sign
    }

    pub fn is_zero(&self) -> bool {
        self.sign == 0
    }

    pub fn abs(self) -> Self {
        Self::new(self.ln_abs, self.sign.abs())
    }

    /// Multiplicative inverse; the inverse of zero is taken to be zero.
    pub fn recip(self) -> Self {
        Self::new(-self.ln_abs, self.sign)
    }

    /// Converts back to `f64`, or `None` if the magnitude exceeds `f64::MAX`.
    pub fn to_f64(&self) -> Option<f64> {
        if self.is_zero() {
            return Some(0.0);
        }
        let magnitude = self.ln_abs.exp();
        if magnitude.is_finite() {
            Some(f64::from(self.sign) * magnitude)
        } else {
            None
        }
    }
}

impl Default for LogValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Display for LogValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_f64() {
            Some(x) => write!(f, "{}", x),
            None => {
                // Print as mantissa * 10^exponent.
                let log10 = self.ln_abs / std::f64::consts::LN_10;
                let exponent = log10.floor();
                let mantissa = 10f64.powf(log10 - exponent) * f64::from(self.sign);
                write!(f, "{:.6}e{}", mantissa, exponent)
            }
        }
    }
}

impl Neg for LogValue {
    type Output = LogValue;

    fn neg(self) -> Self::Output {
        Self::new(self.ln_abs, -self.sign)
    }
}

impl Mul for LogValue {
    type Output = LogValue;

    fn mul(self, rhs: LogValue) -> Self::Output {
        if self.is_zero() || rhs.is_zero() {
            return Self::ZERO;
        }
        Self::new(self.ln_abs + rhs.ln_abs, self.sign * rhs.sign)
    }
}

impl Mul<f64> for LogValue {
    type Output = LogValue;

    fn mul(self, rhs: f64) -> Self::Output {
        self * LogValue::from_f64(rhs)
    }
}

impl Add for LogValue {
    type Output = LogValue;

    fn add(self, rhs: LogValue) -> Self::Output {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        let (hi, lo) = match self.ln_abs.partial_cmp(&rhs.ln_abs) {
            Some(Ordering::Less) => (rhs, self),
            _ => (self, rhs),
        };
        let ratio = (lo.ln_abs - hi.ln_abs).exp();
        if hi.sign == lo.sign {
            Self::new(hi.ln_abs + ratio.ln_1p(), hi.sign)
        } else if ratio >= 1.0 {
            Self::ZERO
        } else {
            Self::new(hi.ln_abs + (-ratio).ln_1p(), hi.sign)
        }
    }
}

/// Result of an evaluation: a plain `f64`, or a [`LogValue`] when the
/// magnitude had to be tracked in log space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
    Direct(f64),
    Log(LogValue),
}

impl Value {
    /// The value as `f64`, or `None` if it does not fit.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Direct(x) => Some(*x),
            Value::Log(v) => v.to_f64(),
        }
    }

    pub fn to_log(&self) -> LogValue {
        match self {
            Value::Direct(x) => LogValue::from_f64(*x),
            Value::Log(v) => *v,
        }
    }

    pub fn is_log(&self) -> bool {
        matches!(self, Value::Log(_))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Direct(x)
    }
}

impl From<LogValue> for Value {
    fn from(v: LogValue) -> Self {
        Value::Log(v)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Direct(x) => write!(f, "{}", x),
            Value::Log(v) => write!(f, "{}", v),
        }
    }
}

/// Running log-sum-exp over signed terms.
///
/// Positive and negative terms are summed separately, so the final
/// subtraction happens exactly once and its cancellation can be measured.
#[derive(Debug, Copy, Clone, Default)]
pub struct LogSum {
    positive: LogValue,
    negative: LogValue,
}

impl LogSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, term: LogValue) {
        match term.sign() {
            1 => self.positive = self.positive + term,
            -1 => self.negative = self.negative + term.abs(),
            _ => {}
        }
    }

    /// The signed sum of all pushed terms.
    pub fn total(&self) -> LogValue {
        self.positive + -self.negative
    }

    /// `|Σ terms| / Σ |terms|`, in `[0, 1]`; `1` for an empty sum.
    ///
    /// Values close to zero mean most significant digits cancelled.
    pub fn cancellation_ratio(&self) -> f64 {
        let magnitude = self.positive + self.negative;
        if magnitude.is_zero() {
            return 1.0;
        }
        let total = self.total();
        if total.is_zero() {
            return 0.0;
        }
        (total.ln_abs() - magnitude.ln_abs()).exp().min(1.0)
    }
}

/// Generalized rising factorial `(x|increment)^n̄ = x (x + inc) ... (x + (n-1) inc)`.
///
/// Short products are multiplied directly; longer ones go through
/// [`ln_rising_factorial`]. A result outside the `f64` range is reported as
/// [`Overflow`][StirlingError::Overflow].
pub fn rising_factorial(x: f64, n: u64, increment: f64) -> Result<f64> {
    if n <= DIRECT_TERMS {
        let mut result = 1.0;
        for i in 0..n {
            result *= x + i as f64 * increment;
        }
        if result.is_finite() {
            return Ok(result);
        }
    } else if let Some(result) = ln_rising_factorial(x, n, increment).to_f64() {
        return Ok(result);
    }
    Err(StirlingError::overflow(format!(
        "rising factorial ({}|{})^{}",
        x, increment, n
    )))
}

/// Log-space rising factorial; a zero factor makes the whole product zero.
pub fn ln_rising_factorial(x: f64, n: u64, increment: f64) -> LogValue {
    let mut acc = LogValue::ONE;
    for i in 0..n {
        let factor = x + i as f64 * increment;
        if factor == 0.0 {
            return LogValue::ZERO;
        }
        acc = acc * factor;
    }
    acc
}

/// Generalized falling factorial `x (x - inc) ... (x - (n-1) inc)`.
pub fn falling_factorial(x: f64, n: u64, increment: f64) -> Result<f64> {
    rising_factorial(x, n, -increment)
}

pub fn ln_falling_factorial(x: f64, n: u64, increment: f64) -> LogValue {
    ln_rising_factorial(x, n, -increment)
}

/// Binomial coefficient `C(n, k)` as `f64`.
pub fn binomial(n: u64, k: u64) -> Result<f64> {
    if k > n {
        return Err(StirlingError::invalid(format!(
            "binomial({}, {}) requires k <= n",
            n, k
        )));
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 1..=k {
        result = result * (n - k + i) as f64 / i as f64;
    }
    if result.is_finite() {
        Ok(result.round())
    } else {
        Err(StirlingError::overflow(format!("binomial({}, {})", n, k)))
    }
}

/// `ln C(n, k)`.
pub fn ln_binomial(n: u64, k: u64) -> Result<f64> {
    if k > n {
        return Err(StirlingError::invalid(format!(
            "binomial({}, {}) requires k <= n",
            n, k
        )));
    }
    let k = k.min(n - k);
    Ok((1..=k)
        .map(|i| ((n - k + i) as f64).ln() - (i as f64).ln())
        .sum())
}

/// `ln n!`.
pub fn ln_factorial(n: u64) -> f64 {
    (2..=n).map(|i| (i as f64).ln()).sum()
}

/// Relative comparison used throughout the crate: `|a - b| <= tol * max(1, |a|, |b|)`.
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    let scale = 1f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= tol * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_factorial_direct() {
        assert_eq!(rising_factorial(2.0, 3, 0.5).unwrap(), 15.0);
        assert_eq!(rising_factorial(1.0, 4, 1.0).unwrap(), 24.0);
        assert_eq!(rising_factorial(5.0, 0, 1.0).unwrap(), 1.0);
        assert_eq!(rising_factorial(-1.0, 3, 1.0).unwrap(), 0.0);
        assert_eq!(rising_factorial(-3.0, 2, 1.0).unwrap(), 6.0);
    }

    #[test]
    fn test_rising_factorial_log_path() {
        // 25! via the log-space branch
        let value = rising_factorial(1.0, 25, 1.0).unwrap();
        assert!(approx_eq(value, 1.5511210043330986e25, 1e-12));

        // Zero factor deep in a long product
        assert_eq!(rising_factorial(-24.0, 30, 1.0).unwrap(), 0.0);

        // Odd number of negative factors
        let value = rising_factorial(-30.5, 25, 1.0).unwrap();
        assert!(value < 0.0);
    }

    #[test]
    fn test_rising_factorial_overflow() {
        let err = rising_factorial(10.0, 400, 1.0).unwrap_err();
        assert!(err.is_overflow());

        let ln = ln_rising_factorial(10.0, 400, 1.0);
        assert_eq!(ln.sign(), 1);
        assert!(approx_eq(ln.ln_abs(), ln_factorial(409) - ln_factorial(9), 1e-12));
    }

    #[test]
    fn test_falling_factorial() {
        assert_eq!(falling_factorial(5.0, 3, 1.0).unwrap(), 60.0);
        assert_eq!(falling_factorial(3.0, 4, 1.0).unwrap(), 0.0);
        let ln = ln_falling_factorial(5.0, 3, 1.0);
        assert!(approx_eq(ln.to_f64().unwrap(), 60.0, 1e-12));
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2).unwrap(), 10.0);
        assert_eq!(binomial(10, 0).unwrap(), 1.0);
        assert_eq!(binomial(10, 10).unwrap(), 1.0);
        assert_eq!(binomial(52, 5).unwrap(), 2598960.0);
        assert!(matches!(
            binomial(3, 4),
            Err(StirlingError::InvalidArgument(_))
        ));
        assert!(approx_eq(ln_binomial(52, 5).unwrap(), 2598960f64.ln(), 1e-12));
    }

    #[test]
    fn test_log_value_arithmetic() {
        let a = LogValue::from_f64(6.0);
        let b = LogValue::from_f64(-4.0);
        assert!(approx_eq((a + b).to_f64().unwrap(), 2.0, 1e-12));
        assert!(approx_eq((b + a).to_f64().unwrap(), 2.0, 1e-12));
        assert!(approx_eq((a * b).to_f64().unwrap(), -24.0, 1e-12));
        assert!(approx_eq((a * 0.5).to_f64().unwrap(), 3.0, 1e-12));
        assert!((a + -a).is_zero());
        assert!(approx_eq((b * a.recip()).to_f64().unwrap(), -4.0 / 6.0, 1e-12));
        assert_eq!((a * 0.0), LogValue::ZERO);
        assert_eq!(LogValue::ZERO + b, b);
    }

    #[test]
    fn test_log_value_beyond_f64() {
        let big = LogValue::new(1000.0, 1);
        assert_eq!(big.to_f64(), None);
        let sum = big + big;
        assert!(approx_eq(sum.ln_abs(), 1000.0 + 2f64.ln(), 1e-12));
        assert!(big.to_string().starts_with("1.97"));
    }

    #[test]
    fn test_log_sum_alternating_second_kind() {
        // sum_j (-1)^j C(k,j) (k-j)^n = k! S2(n,k), dominated by 3^200 for n=200, k=3
        let (n, k) = (200u64, 3u64);
        let mut sum = LogSum::new();
        for j in 0..=k {
            let base = (k - j) as f64;
            let term = ln_rising_factorial(base, n, 0.0) * binomial(k, j).unwrap();
            sum.push(if j % 2 == 0 { term } else { -term });
        }
        let total = sum.total();
        assert_eq!(total.sign(), 1);
        let expected = n as f64 * 3f64.ln() + (1.0 - 3.0 * (2.0f64 / 3.0).powi(200)).ln();
        assert!(approx_eq(total.ln_abs(), expected, 1e-12));
        assert!(sum.cancellation_ratio() > 0.99);
    }

    #[test]
    fn test_log_sum_detects_cancellation() {
        let mut sum = LogSum::new();
        sum.push(LogValue::from_f64(1e10));
        sum.push(LogValue::from_f64(-(1e10 - 1.0)));
        // ln(1e10) carries ~1e-15 absolute error, which scales to ~1e-5 here
        assert!(approx_eq(sum.total().to_f64().unwrap(), 1.0, 1e-4));
        assert!(sum.cancellation_ratio() < 1e-9);

        let mut exact = LogSum::new();
        exact.push(LogValue::from_f64(5.0));
        exact.push(LogValue::from_f64(-5.0));
        assert!(exact.total().is_zero());
        assert_eq!(exact.cancellation_ratio(), 0.0);

        assert_eq!(LogSum::new().cancellation_ratio(), 1.0);
    }
}
