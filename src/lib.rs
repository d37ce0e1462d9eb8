//! Two-dimensional soft-disk foam driven past a circular obstacle.
//!
//! Polydisperse disks interact through the finite-range repulsion
//! `V(r) = (1/alpha) (1 - r/sigma_ij)^alpha` and follow overdamped dynamics in a
//! channel that is periodic along the drive (x) and bounded by soft walls in y.
//!
//! ```no_run
//! use foamflow::config::SimConfig;
//! use foamflow::core::{SeededUniform, Simulation};
//!
//! let cfg = SimConfig { n: 200, total_step: 1000, output_step: 100, ..SimConfig::default() };
//! let mut rng = SeededUniform::from_seed(1);
//! let mut sim = Simulation::new(cfg, &mut rng)?;
//! sim.advance(100)?;
//! let m = sim.measure()?;
//! println!("E = {:.6e}, P = {:.6e}", m.energy, m.pressure);
//! # Ok::<(), foamflow::error::Error>(())
//! ```

pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod output;

#[cfg(feature = "python")]
mod python;
