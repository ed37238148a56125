use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while setting up a simulation.
///
/// Steady-state stepping never fails: capacity limits, minimum radii and
/// out-of-bounds inserts are handled as silent no-ops.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A supplied population does not fit the configuration it is paired with.
    #[error("invalid population: {0}")]
    InvalidPopulation(String),
}
