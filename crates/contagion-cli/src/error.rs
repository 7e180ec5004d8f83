//! Error types for the contagion binary.
//!
//! [`CliError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and output.

/// Top-level error for the contagion binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: contagion_core::config::ConfigError,
    },

    /// Simulation setup or run failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: contagion_sims::error::SimError,
    },

    /// A stats row could not be serialized.
    #[error("serialization error: {source}")]
    Serialize {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing to stdout failed.
    #[error("output error: {source}")]
    Output {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
