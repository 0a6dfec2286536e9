//! Fitting `(α, β)` to observed Stirling measures.
//!
//! The measure of a cell, `(S(n+1,k) - S(n,k-1)) / S(n,k)`, equals
//! `αn + βk` for the unshifted family, so observed measures determine the
//! parameters by ordinary least squares without an intercept.

use log::debug;

use crate::error::EstimationError;

/// One observed `(n, k, measure)` triple.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Observation {
    pub n: u64,
    pub k: u64,
    pub measure: f64,
}

impl Observation {
    pub fn new(n: u64, k: u64, measure: f64) -> Self {
        Self { n, k, measure }
    }
}

impl From<(u64, u64, f64)> for Observation {
    fn from((n, k, measure): (u64, u64, f64)) -> Self {
        Self { n, k, measure }
    }
}

/// Fitted parameters and the coefficient of determination of the fit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Estimate {
    pub alpha: f64,
    pub beta: f64,
    pub r_squared: f64,
}

impl From<Estimate> for (f64, f64, f64) {
    fn from(e: Estimate) -> Self {
        (e.alpha, e.beta, e.r_squared)
    }
}

/// Least-squares fit of `measure ≈ α·n + β·k`.
///
/// Needs at least two observations whose `(n, k)` vectors are not
/// collinear; `r²` is computed against the mean of the measures.
///
/// # Examples
///
/// ```
/// use stirling_rs::estimate::{estimate_parameters, Observation};
///
/// let data: Vec<Observation> = [(3, 1, 1.6), (5, 2, 2.9), (8, 5, 5.9)]
///     .into_iter()
///     .map(Observation::from)
///     .collect();
/// let fit = estimate_parameters(&data).unwrap();
/// assert!((fit.alpha - 0.3).abs() < 1e-9);
/// assert!((fit.beta - 0.7).abs() < 1e-9);
/// ```
pub fn estimate_parameters(observations: &[Observation]) -> Result<Estimate, EstimationError> {
    if let Some(index) = observations.iter().position(|o| !o.measure.is_finite()) {
        return Err(EstimationError::InvalidObservation { index });
    }
    let insufficient = EstimationError::InsufficientData {
        got: observations.len(),
        required: 2,
    };
    if observations.len() < 2 {
        return Err(insufficient);
    }

    let (mut snn, mut snk, mut skk, mut snm, mut skm) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for o in observations {
        let (n, k, m) = (o.n as f64, o.k as f64, o.measure);
        snn += n * n;
        snk += n * k;
        skk += k * k;
        snm += n * m;
        skm += k * m;
    }

    let det = snn * skk - snk * snk;
    if det.abs() <= 1e-12 * snn * skk {
        debug!("singular design: det = {:e}", det);
        return Err(insufficient);
    }
    let alpha = (skk * snm - snk * skm) / det;
    let beta = (snn * skm - snk * snm) / det;

    let mean = observations.iter().map(|o| o.measure).sum::<f64>() / observations.len() as f64;
    let (mut ss_res, mut ss_tot) = (0.0, 0.0);
    for o in observations {
        let predicted = alpha * o.n as f64 + beta * o.k as f64;
        ss_res += (o.measure - predicted).powi(2);
        ss_tot += (o.measure - mean).powi(2);
    }
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Ok(Estimate {
        alpha,
        beta,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::numeric::approx_eq;

    #[test]
    fn test_round_trip_from_engine_measures() {
        let engine = Engine::with_params(0.4, 1.3).unwrap();
        let observations: Vec<Observation> = [(6, 2), (9, 4), (12, 3), (15, 10), (20, 7)]
            .into_iter()
            .map(|(n, k)| Observation::new(n, k, engine.stirling_measure(n, k).unwrap()))
            .collect();

        let fit = estimate_parameters(&observations).unwrap();
        assert!(approx_eq(fit.alpha, 0.4, 1e-8));
        assert!(approx_eq(fit.beta, 1.3, 1e-8));
        assert!(approx_eq(fit.r_squared, 1.0, 1e-10));
    }

    #[test]
    fn test_noisy_data() {
        let noise = [0.05, -0.03, 0.02, -0.04, 0.01, 0.03, -0.02, -0.01];
        let observations: Vec<Observation> = noise
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let (n, k) = (5 + 2 * i as u64, 1 + (i as u64 * 3) % 5);
                Observation::new(n, k, 0.5 * n as f64 + 0.8 * k as f64 + e)
            })
            .collect();

        let (alpha, beta, r_squared) = estimate_parameters(&observations).unwrap().into();
        assert!((alpha - 0.5).abs() < 0.01);
        assert!((beta - 0.8).abs() < 0.02);
        assert!(r_squared > 0.99 && r_squared < 1.0);
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            estimate_parameters(&[]),
            Err(EstimationError::InsufficientData { got: 0, required: 2 })
        );
        assert_eq!(
            estimate_parameters(&[Observation::new(3, 1, 2.0)]),
            Err(EstimationError::InsufficientData { got: 1, required: 2 })
        );
        // (2, 1) and (4, 2) are collinear
        let collinear = [Observation::new(2, 1, 1.0), Observation::new(4, 2, 2.0)];
        assert!(matches!(
            estimate_parameters(&collinear),
            Err(EstimationError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite_measure() {
        let data = [
            Observation::new(3, 1, 1.0),
            Observation::new(4, 2, f64::NAN),
            Observation::new(5, 2, 2.0),
        ];
        assert_eq!(
            estimate_parameters(&data),
            Err(EstimationError::InvalidObservation { index: 1 })
        );
    }
}
