//! Error types for the `craftplan-engine` crate.
//!
//! Planning failures that a caller can act on (empty catalog, missing
//! prices, no viable recipe) are reported as data inside
//! [`PlanComputationResult`](craftplan_types::PlanComputationResult), not as
//! errors. [`PlannerError`] covers the remaining cases: the request was
//! cancelled, or the planner was built with an invalid configuration.

use crate::config::ConfigError;

/// Errors surfaced by [`PlannerService`](crate::service::PlannerService).
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// The caller cancelled the request at a fetch boundary.
    #[error("planning was cancelled")]
    Cancelled,

    /// The planner configuration is invalid.
    #[error("invalid planner configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Failure reported by a collaborator (recipe, vendor, market or producer
/// source).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The backing store or remote service could not be reached.
    #[error("{source_name} unavailable: {message}")]
    Unavailable {
        /// Which collaborator failed.
        source_name: String,
        /// Description of the failure.
        message: String,
    },

    /// The collaborator answered with data that could not be used.
    #[error("{source_name} returned malformed data: {message}")]
    Malformed {
        /// Which collaborator failed.
        source_name: String,
        /// Description of the problem.
        message: String,
    },
}
