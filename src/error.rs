use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the foam simulation and its tooling.
///
/// Every variant is fatal for a run: nothing is retried, since initialization
/// and stepping are deterministic for a fixed configuration and seed.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid, missing or unparseable run parameter.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A particle has more neighbors inside the cutoff than the list may hold.
    #[error(
        "neighbor overflow: particle {particle} has {count} neighbors, capacity is {capacity}"
    )]
    NeighborOverflow {
        particle: usize,
        count: usize,
        capacity: usize,
    },

    /// A force direction is undefined (zero separation).
    #[error("singular geometry: {0}")]
    SingularGeometry(String),

    /// Non-finite state detected (e.g. NaN positions after a blow-up).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Trajectory or measurement input that cannot be parsed.
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// Output directory or file could not be created or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
