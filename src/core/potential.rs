//! Finite-range soft repulsion `V(r) = (1/alpha) (1 - r/sigma_ij)^alpha` for
//! `r < sigma_ij`, zero otherwise, and the energy/stress measurement built on it.

use crate::core::domain::Domain;
use crate::core::neighbor::NeighborList;
use crate::core::particle::Particle;
use crate::error::{Error, Result};

/// Soft pair potential with exponent `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftPotential {
    pub alpha: f64,
}

impl SoftPotential {
    /// Potential with exponent `alpha` (> 1 so the force vanishes continuously at contact).
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 1.0 {
            return Err(Error::Config("alpha must be finite and > 1".into()));
        }
        Ok(Self { alpha })
    }

    /// alpha = 2.
    pub fn harmonic() -> Self {
        Self { alpha: 2.0 }
    }

    /// alpha = 2.5.
    pub fn hertzian() -> Self {
        Self { alpha: 2.5 }
    }

    /// Pair energy for an overlapping contact.
    #[inline]
    pub fn energy(&self, c: &Contact) -> f64 {
        c.overlap().powf(self.alpha) / self.alpha
    }

    /// `(1 - r/sigma)^(alpha - 1)`, the common factor of force and stress.
    #[inline]
    pub fn stiffness_factor(&self, c: &Contact) -> f64 {
        c.overlap().powf(self.alpha - 1.0)
    }

    /// Scalar such that `(dx, dy) * f` is the force on the first particle.
    #[inline]
    pub fn force_scale(&self, c: &Contact) -> f64 {
        self.stiffness_factor(c) / (c.r * c.sigma)
    }
}

/// Geometry of an overlapping pair, seen from the first particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Minimum-image separation `r_i - r_j`.
    pub dx: f64,
    pub dy: f64,
    /// Center distance.
    pub r: f64,
    /// Contact diameter `(sigma_i + sigma_j) / 2`.
    pub sigma: f64,
}

impl Contact {
    /// `1 - r/sigma`, positive for an overlapping pair.
    #[inline]
    pub fn overlap(&self) -> f64 {
        1.0 - self.r / self.sigma
    }
}

/// Contact between particles `i` and `j`, or `None` if they do not overlap.
///
/// Errors:
/// - `Error::SingularGeometry` if the two centers coincide while overlapping.
#[inline]
pub fn contact(
    particles: &[Particle],
    domain: &Domain,
    i: usize,
    j: usize,
) -> Result<Option<Contact>> {
    let (pi, pj) = (&particles[i], &particles[j]);
    let (dx, dy) = domain.minimum_image(pi.r[0] - pj.r[0], pi.r[1] - pj.r[1]);
    let r = (dx * dx + dy * dy).sqrt();
    let sigma = pi.contact_diameter(pj);
    if r >= sigma {
        return Ok(None);
    }
    if r == 0.0 {
        return Err(Error::SingularGeometry(format!(
            "particles {} and {} occupy the same position",
            pi.id, pj.id
        )));
    }
    Ok(Some(Contact { dx, dy, r, sigma }))
}

/// Energy per particle and stresses of one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub energy: f64,
    pub pressure: f64,
    pub shear_stress: f64,
}

/// Total potential energy per particle, pressure and shear stress.
///
/// Each unordered pair is visited from both endpoints, so the sums are halved:
/// energy by `2N`, shear by `2 lx ly`, pressure by `4 lx ly`.
pub fn measure(
    particles: &[Particle],
    domain: &Domain,
    neighbors: &NeighborList,
    potential: &SoftPotential,
) -> Result<Measurement> {
    let mut energy = 0.0;
    let mut shear = 0.0;
    let mut normal = 0.0;
    for (i, j) in neighbors.pairs() {
        let Some(c) = contact(particles, domain, i, j)? else {
            continue;
        };
        let k = potential.stiffness_factor(&c);
        energy += potential.energy(&c);
        shear -= c.dx * c.dy / (c.r * c.sigma) * k;
        normal += c.r / c.sigma * k;
    }
    let n = particles.len().max(1) as f64;
    let area = domain.area();
    Ok(Measurement {
        energy: energy / (2.0 * n),
        pressure: normal / (4.0 * area),
        shear_stress: shear / (2.0 * area),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::neighbor::DEFAULT_MAX_NEIGHBORS;
    use approx::assert_relative_eq;

    fn setup(
        coords: &[[f64; 2]],
        diameters: &[f64],
    ) -> Result<(Vec<Particle>, Domain, NeighborList)> {
        let ps = coords
            .iter()
            .zip(diameters)
            .enumerate()
            .map(|(i, (&r, &d))| Particle::new(i as u32, r, d))
            .collect::<Result<Vec<_>>>()?;
        let domain = Domain::new(10.0, 8.0)?;
        let mut nl = NeighborList::new(3.0, DEFAULT_MAX_NEIGHBORS);
        nl.rebuild(&ps, &domain)?;
        Ok((ps, domain, nl))
    }

    #[test]
    fn harmonic_pair_closed_form() -> Result<()> {
        let (ps, domain, nl) = setup(&[[4.0, 4.0], [4.5, 4.0]], &[1.0, 1.0])?;
        let m = measure(&ps, &domain, &nl, &SoftPotential::harmonic())?;
        // Pair energy 0.5 * 0.5^2 = 0.125, visited twice, divided by 2N = 4.
        assert_relative_eq!(m.energy, 0.0625, max_relative = 1e-14);
        // Normal term per visit 0.5 * 0.5 = 0.25, two visits, / (4 * 80).
        assert_relative_eq!(m.pressure, 0.5 / 320.0, max_relative = 1e-14);
        // dy = 0: no shear.
        assert_eq!(m.shear_stress, 0.0);
        Ok(())
    }

    #[test]
    fn diagonal_pair_has_shear() -> Result<()> {
        let s = 0.3_f64.sqrt();
        let (ps, domain, nl) = setup(&[[4.0, 4.0], [4.0 + s, 4.0 + s]], &[1.0, 1.0])?;
        let m = measure(&ps, &domain, &nl, &SoftPotential::hertzian())?;
        assert!(m.energy > 0.0);
        assert!(m.pressure > 0.0);
        // dx * dy > 0 for both visits, so the shear stress is negative.
        assert!(m.shear_stress < 0.0);
        Ok(())
    }

    #[test]
    fn separated_pair_contributes_nothing() -> Result<()> {
        let (ps, domain, nl) = setup(&[[1.0, 1.0], [2.5, 1.0]], &[1.0, 1.0])?;
        assert_eq!(nl.pairs().count(), 2);
        let m = measure(&ps, &domain, &nl, &SoftPotential::hertzian())?;
        assert_eq!(m.energy, 0.0);
        assert_eq!(m.pressure, 0.0);
        Ok(())
    }

    #[test]
    fn coincident_centers_are_singular() -> Result<()> {
        let (ps, domain, nl) = setup(&[[3.0, 3.0], [3.0, 3.0]], &[1.0, 1.0])?;
        let err = measure(&ps, &domain, &nl, &SoftPotential::harmonic()).unwrap_err();
        assert!(matches!(err, Error::SingularGeometry(_)));
        Ok(())
    }

    #[test]
    fn alpha_must_exceed_one() {
        assert!(SoftPotential::new(1.0).is_err());
        assert!(SoftPotential::new(f64::NAN).is_err());
        assert!(SoftPotential::new(2.5).is_ok());
    }
}
