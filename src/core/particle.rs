use crate::error::{Error, Result};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// A soft disk of the foam.
///
/// Fields:
/// - `id`: stable identifier (index into the particle set)
/// - `r`: position [x, y]
/// - `diameter`: fixed after initialization
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Stable particle identifier.
    pub id: u32,
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Disk diameter.
    pub diameter: f64,
}

impl Particle {
    /// Create a new particle after validating that every component is finite.
    ///
    /// Diameters are not required to be positive: a wide polydispersity draw can
    /// produce non-positive values, which simply never overlap anything.
    pub fn new(id: u32, r: [f64; DIM], diameter: f64) -> Result<Self> {
        if !diameter.is_finite() {
            return Err(Error::Config(format!(
                "diameter of particle {id} must be finite"
            )));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::Config(format!(
                "position of particle {id} must be finite"
            )));
        }
        Ok(Self { id, r, diameter })
    }

    /// Set position (validated as finite).
    pub fn set_position(&mut self, r: [f64; DIM]) -> Result<()> {
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::MathError(format!(
                "position of particle {} became non-finite",
                self.id
            )));
        }
        self.r = r;
        Ok(())
    }

    /// Contact diameter of a pair: the arithmetic mean of both diameters.
    #[inline]
    pub fn contact_diameter(&self, other: &Particle) -> f64 {
        0.5 * (self.diameter + other.diameter)
    }
}
