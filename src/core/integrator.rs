//! Time integration of the overdamped equations of motion.
//!
//! An integrator receives the pair forces of the current configuration and
//! moves every particle by one step, including the confinement forces (walls
//! and obstacle) and the periodic re-wrap.

use std::fmt;

use crate::core::domain::Domain;
use crate::core::particle::{Particle, DIM};
use crate::error::{Error, Result};

/// Diameter the legacy step loop used for the obstacle regardless of configuration.
pub const LEGACY_OBSTACLE_DIAMETER: f64 = 5.0;

/// Soft walls at `y = w` and `y = ly - w` and a circular obstacle at the box center.
///
/// Confinement forces are linear springs of stiffness `stiffness` and act as a
/// position update fused into the same step, applied after the pair-force move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confinement {
    pub wall_offset: f64,
    pub stiffness: f64,
    pub obstacle_diameter: f64,
}

impl Confinement {
    /// Push a single position out of the walls and obstacle.
    ///
    /// Errors:
    /// - `Error::SingularGeometry` if the position sits exactly on the obstacle
    ///   center, where the radial direction is undefined.
    pub fn apply(&self, r: &mut [f64; DIM], domain: &Domain, dt: f64) -> Result<()> {
        let w = self.wall_offset;
        let k = self.stiffness;

        if r[1] < w {
            r[1] += k * (w - r[1]) * dt;
        }
        let upper = domain.ly - w;
        if r[1] > upper {
            r[1] -= k * (r[1] - upper) * dt;
        }

        let radius = 0.5 * self.obstacle_diameter;
        let [cx, cy] = domain.center();
        let (ox, oy) = (r[0] - cx, r[1] - cy);
        let dist = (ox * ox + oy * oy).sqrt();
        if dist < radius {
            if dist == 0.0 {
                return Err(Error::SingularGeometry(
                    "particle sits exactly on the obstacle center".into(),
                ));
            }
            let push = -k * (dist - radius) / dist * dt;
            r[0] += push * ox;
            r[1] += push * oy;
        }
        Ok(())
    }
}

/// Everything an integrator needs besides the particles and their pair forces.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub domain: &'a Domain,
    pub confinement: &'a Confinement,
    /// Uniform drive along +x.
    pub fx_ext: f64,
    pub dt: f64,
}

/// Time-stepping strategy.
pub trait Integrator: fmt::Debug + Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Advance all particles by one step given their pair forces.
    fn advance(
        &self,
        particles: &mut [Particle],
        forces: &[[f64; DIM]],
        ctx: &StepContext<'_>,
    ) -> Result<()>;
}

/// Explicit forward Euler for mobility-one overdamped dynamics:
/// `r += (F + F_ext) dt`, then confinement, then periodic wrap on both axes.
///
/// The y wrap is kept even though walls bound y: a particle overshooting a wall
/// reappears on the far side instead of being stopped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn name(&self) -> &'static str {
        "forward-euler"
    }

    fn advance(
        &self,
        particles: &mut [Particle],
        forces: &[[f64; DIM]],
        ctx: &StepContext<'_>,
    ) -> Result<()> {
        if forces.len() != particles.len() {
            return Err(Error::MathError(format!(
                "{} forces for {} particles",
                forces.len(),
                particles.len()
            )));
        }
        for (p, f) in particles.iter_mut().zip(forces) {
            let mut r = [
                p.r[0] + (f[0] + ctx.fx_ext) * ctx.dt,
                p.r[1] + f[1] * ctx.dt,
            ];
            ctx.confinement.apply(&mut r, ctx.domain, ctx.dt)?;
            p.set_position(ctx.domain.wrap(r))?;
        }
        Ok(())
    }
}
