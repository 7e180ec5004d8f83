//! Error types for the contagion-sims crate.
//!
//! Parameter validation, topology generation, seeding and the run itself
//! all report through [`SimError`].

use contagion_core::graph::GraphError;
use contagion_core::runner::RunError;

/// Errors that can occur while building or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A probability parameter was outside `[0, 1]` or not a number.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability {
        /// The parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A topology parameter was rejected.
    #[error("invalid topology: {reason}")]
    InvalidTopology {
        /// Description of the constraint that failed.
        reason: String,
    },

    /// More seed vertices were requested than the population holds.
    #[error("cannot seed {requested} vertices in a population of {population}")]
    TooManySeeds {
        /// Number of vertices requested.
        requested: u64,
        /// Population size.
        population: usize,
    },

    /// The population does not fit in memory on this platform.
    #[error("population {0} is too large for this platform")]
    PopulationTooLarge(u64),

    /// The incubation window must be at least one superstep.
    #[error("incubation must be at least 1 superstep")]
    ZeroIncubation,

    /// Generated vertex records failed graph validation.
    #[error("graph error: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: GraphError,
    },

    /// The engine run failed.
    #[error("run error: {source}")]
    Run {
        /// The underlying run error.
        #[from]
        source: RunError,
    },
}
