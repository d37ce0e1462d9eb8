//! Verlet neighbor list.

use ordered_float::NotNan;

use crate::core::domain::Domain;
use crate::core::particle::{Particle, DIM};
use crate::error::{Error, Result};

/// Diameter assumed for the largest particle when sizing the Verlet skin.
pub const REFERENCE_DIAMETER: f64 = 1.0;

/// Default per-particle neighbor capacity.
pub const DEFAULT_MAX_NEIGHBORS: usize = 500;

/// Per-particle lists of nearby particles, stored as one flat adjacency array
/// with offsets.
///
/// Both (i, j) and (j, i) are tested independently, so every unordered pair
/// within the cutoff appears once in each endpoint's list. Within a list,
/// indices appear in ascending order of `j`.
#[derive(Debug, Clone)]
pub struct NeighborList {
    r_neighbor: f64,
    max_neighbors: usize,
    offsets: Vec<usize>,
    indices: Vec<usize>,
    /// Positions at the last rebuild.
    reference: Vec<[f64; DIM]>,
}

impl NeighborList {
    /// Empty list with cutoff `r_neighbor` and per-particle capacity `max_neighbors`.
    pub fn new(r_neighbor: f64, max_neighbors: usize) -> Self {
        Self {
            r_neighbor,
            max_neighbors,
            offsets: vec![0],
            indices: Vec::new(),
            reference: Vec::new(),
        }
    }

    /// Cutoff radius.
    pub fn cutoff(&self) -> f64 {
        self.r_neighbor
    }

    /// Displacement beyond which the list may miss a contact.
    pub fn skin_threshold(&self) -> f64 {
        (self.r_neighbor - REFERENCE_DIAMETER) / 2.0
    }

    /// Number of particles covered by the last rebuild.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Neighbors of particle `i`.
    #[inline]
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.indices[self.offsets[i]..self.offsets[i + 1]]
    }

    /// All ordered pairs (i, j) in list order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.len()).flat_map(move |i| self.neighbors(i).iter().map(move |&j| (i, j)))
    }

    /// All-pairs O(N^2) rebuild and reset of the reference snapshot.
    ///
    /// Errors:
    /// - `Error::NeighborOverflow` if a particle has more than `max_neighbors`
    ///   neighbors within the cutoff. The list is left empty in that case.
    pub fn rebuild(&mut self, particles: &[Particle], domain: &Domain) -> Result<()> {
        let n = particles.len();
        let cutoff = self.cutoff();
        self.offsets.clear();
        self.indices.clear();
        self.offsets.push(0);

        for (i, pi) in particles.iter().enumerate() {
            let start = self.indices.len();
            for (j, pj) in particles.iter().enumerate() {
                if j == i {
                    continue;
                }
                let (dx, dy) = domain.minimum_image(pi.r[0] - pj.r[0], pi.r[1] - pj.r[1]);
                if (dx * dx + dy * dy).sqrt() < cutoff {
                    self.indices.push(j);
                }
            }
            let count = self.indices.len() - start;
            if count > self.max_neighbors {
                self.offsets.truncate(1);
                self.indices.clear();
                self.reference.clear();
                return Err(Error::NeighborOverflow {
                    particle: i,
                    count,
                    capacity: self.max_neighbors,
                });
            }
            self.offsets.push(self.indices.len());
        }

        self.reference.clear();
        self.reference.extend(particles.iter().map(|p| p.r));
        debug_assert_eq!(self.offsets.len(), n + 1);
        Ok(())
    }

    /// Largest minimum-image displacement of any particle since the last rebuild.
    ///
    /// Errors:
    /// - `Error::MathError` if a displacement is NaN (the state has blown up).
    pub fn max_displacement(&self, particles: &[Particle], domain: &Domain) -> Result<f64> {
        let mut max = NotNan::new(0.0).map_err(|_| Error::MathError("NaN literal".into()))?;
        for (p, r0) in particles.iter().zip(&self.reference) {
            let (dx, dy) = domain.minimum_image(p.r[0] - r0[0], p.r[1] - r0[1]);
            let dr = NotNan::new((dx * dx + dy * dy).sqrt()).map_err(|_| {
                Error::MathError(format!("displacement of particle {} is NaN", p.id))
            })?;
            max = max.max(dr);
        }
        Ok(max.into_inner())
    }

    /// True when the list no longer matches the particle set or when some
    /// particle moved further than the skin threshold.
    pub fn needs_rebuild(&self, particles: &[Particle], domain: &Domain) -> Result<bool> {
        if self.reference.len() != particles.len() {
            return Ok(true);
        }
        Ok(self.max_displacement(particles, domain)? > self.skin_threshold())
    }
}
