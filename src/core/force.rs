//! Pairwise conservative forces from the soft potential.

use crate::core::domain::Domain;
use crate::core::neighbor::NeighborList;
use crate::core::particle::{Particle, DIM};
use crate::core::potential::{contact, SoftPotential};
use crate::error::Result;

/// Zero `forces` and accumulate, for every particle, the repulsion from each
/// overlapping entry of its neighbor list.
///
/// Mobility is one, so these are directly the drift velocities of the
/// overdamped dynamics.
pub fn compute_forces(
    particles: &[Particle],
    domain: &Domain,
    neighbors: &NeighborList,
    potential: &SoftPotential,
    forces: &mut Vec<[f64; DIM]>,
) -> Result<()> {
    forces.clear();
    forces.resize(particles.len(), [0.0; DIM]);
    for (i, j) in neighbors.pairs() {
        if let Some(c) = contact(particles, domain, i, j)? {
            let f = potential.force_scale(&c);
            forces[i][0] += c.dx * f;
            forces[i][1] += c.dy * f;
        }
    }
    Ok(())
}

/// Euclidean norm of the stacked force vector.
pub fn force_norm(forces: &[[f64; DIM]]) -> f64 {
    forces
        .iter()
        .map(|f| f[0] * f[0] + f[1] * f[1])
        .sum::<f64>()
        .sqrt()
}
