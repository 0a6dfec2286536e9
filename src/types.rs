//! Parameter and method types.
//!
//! [`Params`] holds the fixed `(α, β, r)` of an engine in L-notation, where
//! one step of the triangular recurrence carries the weight `α(n-1) + βk + r`.
//! [`ParamsKey`] is its exact, hashable fingerprint used by both cache tiers.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StirlingError};

/// Parameters `(α, β, r)` of the generalized Stirling family.
///
/// # Invariants
///
/// - All three values are finite.
/// - Negative zero is stored as `+0.0`, so equal parameters have equal keys.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Params {
    alpha: f64,
    beta: f64,
    r: f64,
}

fn canonical(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

impl Params {
    /// Creates the two-parameter family `S(n,k;α,β)` (shift `r = 0`).
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        Self::with_shift(alpha, beta, 0.0)
    }

    /// Creates the shifted family with weight `α(n-1) + βk + r`.
    pub fn with_shift(alpha: f64, beta: f64, r: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("r", r)] {
            if !value.is_finite() {
                return Err(StirlingError::invalid(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            alpha: canonical(alpha),
            beta: canonical(beta),
            r: canonical(r),
        })
    }

    /// Converts Hsu-Shiue parameters `S(n,k;α,β,r)` into L-notation.
    ///
    /// Hsu-Shiue numbers satisfy `S(n,k) = S(n-1,k-1) + (βk - α(n-1) + r) S(n-1,k)`,
    /// which is the L-notation recurrence with `α` negated.
    pub fn from_hsu_shiue(alpha: f64, beta: f64, r: f64) -> Result<Self> {
        Self::with_shift(-alpha, beta, r)
    }

    /// Returns the Hsu-Shiue triple `(α, β, r)` describing the same numbers.
    pub fn to_hsu_shiue(&self) -> (f64, f64, f64) {
        (canonical(-self.alpha), self.beta, self.r)
    }

    /// Unsigned Stirling numbers of the first kind, `(α, β) = (1, 0)`.
    pub fn first_kind() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.0,
            r: 0.0,
        }
    }

    /// Stirling numbers of the second kind, `(α, β) = (0, 1)`.
    pub fn second_kind() -> Self {
        Self {
            alpha: 0.0,
            beta: 1.0,
            r: 0.0,
        }
    }

    /// Lah numbers, `(α, β) = (1, 1)`.
    pub fn lah() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            r: 0.0,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
    pub fn beta(&self) -> f64 {
        self.beta
    }
    pub fn r(&self) -> f64 {
        self.r
    }

    /// Whether this is the unshifted two-parameter family.
    pub fn is_unshifted(&self) -> bool {
        self.r == 0.0
    }

    /// Weight of the step from row `n - 1` to row `n` staying in column `k`.
    #[inline]
    pub fn weight(&self, n: u64, k: u64) -> f64 {
        self.alpha * (n as f64 - 1.0) + self.beta * k as f64 + self.r
    }

    pub fn key(&self) -> ParamsKey {
        ParamsKey {
            alpha: self.alpha.to_bits(),
            beta: self.beta.to_bits(),
            r: self.r.to_bits(),
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unshifted() {
            write!(f, "α={}, β={}", self.alpha, self.beta)
        } else {
            write!(f, "α={}, β={}, r={}", self.alpha, self.beta, self.r)
        }
    }
}

/// Exact fingerprint of [`Params`]: the IEEE-754 bit patterns of `(α, β, r)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParamsKey {
    pub alpha: u64,
    pub beta: u64,
    pub r: u64,
}

impl fmt::Display for ParamsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{:016x}-b{:016x}-r{:016x}", self.alpha, self.beta, self.r)
    }
}

/// Evaluation strategy for `S(n, k)`.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Let the [selector][crate::selector::select_method] decide.
    #[default]
    Auto,
    Triangular,
    BottomUp,
    Explicit,
    Horizontal,
    Vertical,
    Symmetric,
    /// Closed-form product for `k = 1`.
    SingleList,
}

impl Method {
    /// All concrete strategies (everything except [`Method::Auto`]).
    pub const STRATEGIES: [Method; 7] = [
        Method::Triangular,
        Method::BottomUp,
        Method::Explicit,
        Method::Horizontal,
        Method::Vertical,
        Method::Symmetric,
        Method::SingleList,
    ];

    /// Stable tag used in cache keys and file names.
    pub fn tag(self) -> &'static str {
        match self {
            Method::Auto => "auto",
            Method::Triangular => "triangular",
            Method::BottomUp => "bottom_up",
            Method::Explicit => "explicit",
            Method::Horizontal => "horizontal",
            Method::Vertical => "vertical",
            Method::Symmetric => "symmetric",
            Method::SingleList => "single_list",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Method {
    type Err = StirlingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Method::Auto),
            _ => Method::STRATEGIES
                .into_iter()
                .find(|m| m.tag() == s)
                .ok_or_else(|| StirlingError::invalid(format!("unknown method '{}'", s))),
        }
    }
}
