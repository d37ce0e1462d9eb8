#![allow(missing_docs)] // Doc comments live on the public items of each submodule

//! Simulation engine for the driven soft-disk foam.
//!
//! Leaves first: random sampling, diameter generation, box sizing, neighbor
//! list, pair potential and forces, integrator, and the driver tying them together.

pub mod domain;
pub mod force;
pub mod integrator;
pub mod neighbor;
pub mod particle;
pub mod polydisperse;
pub mod potential;
pub mod random;
pub mod sim;

pub use domain::Domain;
pub use integrator::{Confinement, ForwardEuler, Integrator, StepContext};
pub use neighbor::NeighborList;
pub use particle::Particle;
pub use potential::{Measurement, SoftPotential};
pub use random::{SeededUniform, UniformSource};
pub use sim::{Observer, Simulation};
