//! Polydisperse diameter generation.
//!
//! Raw diameters are `1 + delta * z` with `z` a Box-Muller normal deviate. The
//! raw ensemble is then rescaled affinely so that its realized mean is exactly 1
//! and its population variance exactly `delta^2`, whatever the draw was.

use std::f64::consts::PI;

use crate::core::random::UniformSource;
use crate::error::{Error, Result};

/// Mean, population variance and sum of squares of a diameter ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiameterStats {
    pub mean: f64,
    pub variance: f64,
    pub sum_of_squares: f64,
}

impl DiameterStats {
    /// Statistics of `diameters` (all zero for an empty slice).
    pub fn of(diameters: &[f64]) -> Self {
        if diameters.is_empty() {
            return Self {
                mean: 0.0,
                variance: 0.0,
                sum_of_squares: 0.0,
            };
        }
        let n = diameters.len() as f64;
        let mean = diameters.iter().sum::<f64>() / n;
        let variance = diameters.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
        let sum_of_squares = diameters.iter().map(|d| d * d).sum();
        Self {
            mean,
            variance,
            sum_of_squares,
        }
    }
}

/// One standard normal deviate from two uniforms in (0, 1).
#[inline]
pub fn box_muller(u1: f64, u2: f64) -> f64 {
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Draw `n` diameters with mean 1 and population variance `delta^2`.
///
/// `delta == 0` yields a monodisperse set of unit diameters and consumes no
/// random numbers.
///
/// Errors:
/// - `Error::Config` if `n == 0`, `delta` is negative or non-finite, or the raw
///   draw has zero variance (e.g. a single particle with `delta > 0`).
pub fn polydisperse_diameters<U>(n: usize, delta: f64, rng: &mut U) -> Result<Vec<f64>>
where
    U: UniformSource + ?Sized,
{
    if n == 0 {
        return Err(Error::Config("particle count must be > 0".into()));
    }
    if !delta.is_finite() || delta < 0.0 {
        return Err(Error::Config("delta must be finite and >= 0".into()));
    }
    if delta == 0.0 {
        return Ok(vec![1.0; n]);
    }

    let mut diameters: Vec<f64> = (0..n)
        .map(|_| {
            let u1 = rng.next_open01();
            let u2 = rng.next_open01();
            1.0 + delta * box_muller(u1, u2)
        })
        .collect();

    let raw = DiameterStats::of(&diameters);
    if !(raw.variance.is_finite() && raw.variance > 0.0) {
        return Err(Error::Config(format!(
            "raw diameter draw has degenerate variance {} (N = {n}); polydispersity needs N > 1",
            raw.variance
        )));
    }

    let a = delta / raw.variance.sqrt();
    let b = 1.0 - raw.mean * a;
    for d in &mut diameters {
        *d = a * *d + b;
    }

    let non_positive = diameters.iter().filter(|&&d| d <= 0.0).count();
    if non_positive > 0 {
        log::warn!(
            "{non_positive} of {n} diameters are non-positive at delta = {delta}; those disks never overlap"
        );
    }
    Ok(diameters)
}
