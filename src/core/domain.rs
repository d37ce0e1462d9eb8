use std::f64::consts::PI;

use crate::core::particle::DIM;
use crate::error::{Error, Result};

/// Rectangular simulation box `[0, lx) x [0, ly]`, fixed for the whole run.
///
/// x is periodic. y is bounded by soft walls at `w` and `ly - w`, but distances
/// are still taken with the minimum image along y as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub lx: f64,
    pub ly: f64,
}

impl Domain {
    /// Box with explicit edge lengths (each finite and > 0).
    pub fn new(lx: f64, ly: f64) -> Result<Self> {
        if !(lx.is_finite() && lx > 0.0 && ly.is_finite() && ly > 0.0) {
            return Err(Error::Config(format!(
                "box edges must be finite and > 0, got {lx} x {ly}"
            )));
        }
        Ok(Self { lx, ly })
    }

    /// Size the box so the disks cover an area fraction `phi` once the wall
    /// margins `w` and the obstacle area are excluded:
    ///
    /// `ly = w + sqrt(w^2 + pi/(4 gamma) * (sum_sq/phi + sigm_obs^2))`, `lx = gamma * ly`.
    pub fn from_packing(phi: f64, gamma: f64, w: f64, sigm_obs: f64, sum_sq: f64) -> Result<Self> {
        if !phi.is_finite() || phi <= 0.0 {
            return Err(Error::Config("phi must be finite and > 0".into()));
        }
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(Error::Config("gamma must be finite and > 0".into()));
        }
        if !w.is_finite() || w < 0.0 {
            return Err(Error::Config("w must be finite and >= 0".into()));
        }
        let ly = w + (w * w + (PI / (4.0 * gamma)) * (sum_sq / phi + sigm_obs * sigm_obs)).sqrt();
        if !ly.is_finite() || ly <= 0.0 {
            return Err(Error::Config(format!("derived L_y = {ly} is not positive")));
        }
        Ok(Self { lx: gamma * ly, ly })
    }

    /// Box area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.lx * self.ly
    }

    /// Center of the box, where the obstacle sits.
    #[inline]
    pub fn center(&self) -> [f64; DIM] {
        [0.5 * self.lx, 0.5 * self.ly]
    }

    /// Minimum-image separation: at most one box length is added or removed per axis.
    #[inline]
    pub fn minimum_image(&self, dx: f64, dy: f64) -> (f64, f64) {
        (image(dx, self.lx), image(dy, self.ly))
    }

    /// Wrap a position back into the box along both axes.
    #[inline]
    pub fn wrap(&self, r: [f64; DIM]) -> [f64; DIM] {
        [wrap_periodic(r[0], self.lx), wrap_periodic(r[1], self.ly)]
    }
}

#[inline]
fn image(d: f64, len: f64) -> f64 {
    if d > 0.5 * len {
        d - len
    } else if d < -0.5 * len {
        d + len
    } else {
        d
    }
}

/// Periodic wrap of `x` into `[0, len)`.
#[inline]
pub fn wrap_periodic(x: f64, len: f64) -> f64 {
    let w = x.rem_euclid(len);
    // rem_euclid of a tiny negative value can round up to exactly `len`.
    if w >= len {
        0.0
    } else {
        w
    }
}
