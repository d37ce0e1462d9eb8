//! Uniform random sampling used during initialization.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of uniform deviates in the open interval (0, 1).
///
/// The simulation core only ever draws through this trait, so tests can feed
/// fixed sequences and alternate generators can be swapped in.
pub trait UniformSource {
    /// Next deviate, strictly inside (0, 1).
    fn next_open01(&mut self) -> f64;
}

/// Seedable generator backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededUniform {
    rng: StdRng,
    seed: u64,
}

impl SeededUniform {
    /// Deterministic generator for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from wall-clock seconds offset by the run index, so concurrent
    /// runs launched in the same second still differ.
    pub fn from_clock(run: u64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_seed(now.wrapping_add(run))
    }

    /// The seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl UniformSource for SeededUniform {
    fn next_open01(&mut self) -> f64 {
        loop {
            let u: f64 = self.rng.random();
            if u > 0.0 {
                return u;
            }
        }
    }
}
