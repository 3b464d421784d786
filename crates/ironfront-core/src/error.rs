//! Error types for the simulation core.

use rubble::GridError;
use thiserror::Error;

/// Rejected game configuration.
///
/// Returned by [`GameConfig::validate`](crate::config::GameConfig::validate)
/// and by every `Simulation` constructor that accepts a config.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A size or count that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: i64,
    },
    /// A probability fell outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    InvalidProbability {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f64,
    },
    /// A duration of zero ticks.
    #[error("{field} must last at least one tick")]
    ZeroDuration {
        /// Offending field.
        field: &'static str,
    },
    /// The terrain grid could not be built from the configured geometry.
    #[error("invalid grid geometry: {0}")]
    Grid(#[from] GridError),
}
