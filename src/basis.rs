//! Change of polynomial basis through the Stirling triangle.
//!
//! The numbers `S(n,k;α,β,r)` are the connection coefficients between two
//! families of polynomials in `t`:
//!
//! ```text
//! (t + r | α)^n̄ = Σ_k S(n,k) (t | β)_k
//! ```
//!
//! where `(x | α)^n̄ = x (x+α) ... (x+(n-1)α)` is the generalized rising power
//! and `(x | β)_k = x (x-β) ... (x-(k-1)β)` the generalized falling factorial.
//! With `α = r = 0` the left side is the ordinary power basis `t^n`, and the
//! second-kind parameters give the classical power to falling-factorial
//! conversion.
//!
//! ```
//! use stirling_rs::engine::Engine;
//!
//! // t^2 = (t)_2 + (t)_1
//! let engine = Engine::with_params(0.0, 1.0).unwrap();
//! let factorial = engine.power_to_factorial(&[0.0, 0.0, 1.0]).unwrap();
//! assert_eq!(factorial, vec![0.0, 1.0, 1.0]);
//! assert_eq!(engine.factorial_to_power(&factorial).unwrap(), vec![0.0, 0.0, 1.0]);
//! ```

use crate::engine::Engine;
use crate::error::{Result, StirlingError};

impl Engine {
    /// Rewrites `Σ_n c_n (t + r | α)^n̄` as `Σ_k d_k (t | β)_k`.
    pub fn power_to_factorial(&self, coefficients: &[f64]) -> Result<Vec<f64>> {
        let rows = self.connection_rows(coefficients.len())?;
        let mut result = vec![0.0; coefficients.len()];
        for (n, (&c, row)) in coefficients.iter().zip(&rows).enumerate() {
            for (k, &s) in row.iter().enumerate().take(n + 1) {
                result[k] += c * s;
            }
        }
        check_finite(result, "power to factorial")
    }

    /// Inverse of [`power_to_factorial`][Self::power_to_factorial].
    ///
    /// The connection matrix is unit triangular, so the coefficients are
    /// recovered by back substitution from the highest degree down.
    pub fn factorial_to_power(&self, coefficients: &[f64]) -> Result<Vec<f64>> {
        let rows = self.connection_rows(coefficients.len())?;
        let mut result = vec![0.0; coefficients.len()];
        for k in (0..coefficients.len()).rev() {
            let higher: f64 = (k + 1..coefficients.len())
                .map(|n| result[n] * rows[n][k])
                .sum();
            result[k] = coefficients[k] - higher;
        }
        check_finite(result, "factorial to power")
    }

    fn connection_rows(&self, len: usize) -> Result<Vec<Vec<f64>>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        Ok(self.generate_triangle(len as u64 - 1, false)?.to_dense())
    }
}

fn check_finite(values: Vec<f64>, what: &str) -> Result<Vec<f64>> {
    if values.iter().all(|x| x.is_finite()) {
        Ok(values)
    } else {
        Err(StirlingError::overflow(format!("{} basis change", what)))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::numeric::approx_eq;
    use crate::types::Params;

    fn rising(x: f64, n: usize, increment: f64) -> f64 {
        (0..n).map(|i| x + i as f64 * increment).product()
    }

    fn falling(x: f64, k: usize, increment: f64) -> f64 {
        (0..k).map(|i| x - i as f64 * increment).product()
    }

    #[test]
    fn test_power_to_falling_factorials() {
        let engine = Engine::new(Params::second_kind(), EngineConfig::default());
        // t^3 = (t)_3 + 3 (t)_2 + (t)_1
        let d = engine.power_to_factorial(&[0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(d, vec![0.0, 1.0, 3.0, 1.0]);

        // Unsigned first kind: t (t+1) (t+2) (t+3) = t^4 + 6 t^3 + 11 t^2 + 6 t
        let first = Engine::new(Params::first_kind(), EngineConfig::default());
        let d = first.power_to_factorial(&[0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(d, vec![0.0, 6.0, 11.0, 6.0, 1.0]);
    }

    #[test]
    fn test_basis_change_preserves_the_polynomial() {
        let (alpha, beta, r) = (0.5, 0.7, 2.0);
        let engine = Engine::new(
            Params::with_shift(alpha, beta, r).unwrap(),
            EngineConfig::default(),
        );
        let c = [1.0, -2.0, 0.5, 3.0, 0.0, 1.5, -1.0];
        let d = engine.power_to_factorial(&c).unwrap();

        for t in [0.3, 1.7, -2.2] {
            let lhs: f64 = c
                .iter()
                .enumerate()
                .map(|(n, c)| c * rising(t + r, n, alpha))
                .sum();
            let rhs: f64 = d
                .iter()
                .enumerate()
                .map(|(k, d)| d * falling(t, k, beta))
                .sum();
            assert!(approx_eq(lhs, rhs, 1e-10), "t = {}: {} vs {}", t, lhs, rhs);
        }

        let back = engine.factorial_to_power(&d).unwrap();
        for (a, b) in back.iter().zip(&c) {
            assert!(approx_eq(*a, *b, 1e-10));
        }
    }

    #[test]
    fn test_empty_coefficients() {
        let engine = Engine::default();
        assert!(engine.power_to_factorial(&[]).unwrap().is_empty());
        assert!(engine.factorial_to_power(&[]).unwrap().is_empty());
    }
}
