//! Configuration loading and typed config structures for Contagion runs.
//!
//! The canonical configuration lives in `contagion-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and
//! provides a loader that reads, overrides from the environment, and
//! validates the file.
//!
//! The `epidemic` and `social` sections are simulation parameters. The
//! engine itself never reads them; they reach the update rules by capture.

use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding `run.seed`.
pub const SEED_ENV: &str = "CONTAGION_SEED";

/// Environment variable overriding `run.max_supersteps`.
pub const MAX_SUPERSTEPS_ENV: &str = "CONTAGION_MAX_SUPERSTEPS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// The offending variable name.
        var: &'static str,
        /// The raw value found in the environment.
        value: String,
    },

    /// A value is out of its permitted range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Which simulation the binary runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    /// SIR-style epidemic with incubation and death.
    #[default]
    Epidemic,
    /// One-way platform switching in a social network.
    Social,
}

/// Random graph model used to build the topology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    /// `G(n, p)`: each unordered pair is connected with probability `p`.
    #[default]
    ErdosRenyi,
    /// Ring lattice with random rewiring (small world).
    WattsStrogatz,
}

/// Top-level configuration.
///
/// Mirrors the structure of `contagion-config.yaml`. All fields have
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run-level settings (name, seed, simulation, ceiling).
    #[serde(default)]
    pub run: RunConfig,

    /// Topology generation parameters.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Epidemic simulation parameters.
    #[serde(default)]
    pub epidemic: EpidemicConfig,

    /// Platform-switching simulation parameters.
    #[serde(default)]
    pub social: SocialConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CONTAGION_SEED` overrides `run.seed`
    /// - `CONTAGION_MAX_SUPERSTEPS` overrides `run.max_supersteps`
    ///
    /// The result is validated before it is returned.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// No environment overrides are applied; the result is validated.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(SEED_ENV) {
            self.run.seed = parse_env(SEED_ENV, value)?;
        }
        if let Some(value) = lookup(MAX_SUPERSTEPS_ENV) {
            self.run.max_supersteps = parse_env(MAX_SUPERSTEPS_ENV, value)?;
        }
        Ok(())
    }

    /// Check ranges and cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.population == 0 {
            return Err(invalid("graph.population must be at least 1"));
        }
        // Healthy and platform vertices never vote to halt, so neither
        // simulation ends without a ceiling.
        if self.run.max_supersteps == 0 {
            return Err(invalid(
                "run.max_supersteps must be at least 1; healthy and platform vertices never halt",
            ));
        }
        check_probability("graph.edge_probability", self.graph.edge_probability)?;
        check_probability("graph.rewire_probability", self.graph.rewire_probability)?;
        if self.graph.topology == TopologyKind::WattsStrogatz {
            if self.graph.neighbors % 2 != 0 {
                return Err(invalid("graph.neighbors must be even for watts_strogatz"));
            }
            if u64::from(self.graph.neighbors) >= self.graph.population {
                return Err(invalid("graph.neighbors must be smaller than graph.population"));
            }
        }

        check_probability(
            "epidemic.infection_probability",
            self.epidemic.infection_probability,
        )?;
        if self.epidemic.incubation_steps == 0 {
            return Err(invalid("epidemic.incubation_steps must be at least 1"));
        }
        if self.epidemic.initial_infected > self.graph.population {
            return Err(invalid("epidemic.initial_infected exceeds graph.population"));
        }

        check_probability("social.switch_probability", self.social.switch_probability)?;
        check_probability(
            "social.activity_probability",
            self.social.activity_probability,
        )?;
        if self.social.initial_switched > self.graph.population {
            return Err(invalid("social.initial_switched exceeds graph.population"));
        }
        Ok(())
    }
}

/// Run-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Human-readable run name, echoed in logs.
    #[serde(default = "default_run_name")]
    pub name: String,

    /// Random seed for topology, seeding and update rules.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Which simulation to run.
    #[serde(default)]
    pub simulation: SimulationKind,

    /// Superstep ceiling. Must be at least 1 for the bundled simulations.
    #[serde(default = "default_max_supersteps")]
    pub max_supersteps: u64,
}

impl RunConfig {
    /// The ceiling as the engine expects it: `None` when `max_supersteps`
    /// is 0, which only an unvalidated config can carry.
    pub const fn step_ceiling(&self) -> Option<u64> {
        if self.max_supersteps == 0 {
            None
        } else {
            Some(self.max_supersteps)
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: default_run_name(),
            seed: default_seed(),
            simulation: SimulationKind::default(),
            max_supersteps: default_max_supersteps(),
        }
    }
}

/// Topology generation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphConfig {
    /// Number of vertices.
    #[serde(default = "default_population")]
    pub population: u64,

    /// Random graph model.
    #[serde(default)]
    pub topology: TopologyKind,

    /// Edge-formation probability for `erdos_renyi`.
    #[serde(default = "default_edge_probability")]
    pub edge_probability: f64,

    /// Ring degree for `watts_strogatz` (must be even).
    #[serde(default = "default_neighbors")]
    pub neighbors: u32,

    /// Per-edge rewiring probability for `watts_strogatz`.
    #[serde(default = "default_rewire_probability")]
    pub rewire_probability: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            population: default_population(),
            topology: TopologyKind::default(),
            edge_probability: default_edge_probability(),
            neighbors: default_neighbors(),
            rewire_probability: default_rewire_probability(),
        }
    }
}

/// Epidemic simulation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EpidemicConfig {
    /// Per-contact infection probability `p`.
    #[serde(default = "default_infection_probability")]
    pub infection_probability: f64,

    /// Number of supersteps a vertex stays infectious before dying.
    #[serde(default = "default_incubation_steps")]
    pub incubation_steps: u32,

    /// Number of vertices infected at superstep 0.
    #[serde(default = "default_initial_infected")]
    pub initial_infected: u64,
}

impl Default for EpidemicConfig {
    fn default() -> Self {
        Self {
            infection_probability: default_infection_probability(),
            incubation_steps: default_incubation_steps(),
            initial_infected: default_initial_infected(),
        }
    }
}

/// Platform-switching simulation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SocialConfig {
    /// Probability `sp` of switching when M messages outnumber F messages.
    #[serde(default = "default_switch_probability")]
    pub switch_probability: f64,

    /// Probability `a` of contacting each neighbor in a round.
    #[serde(default = "default_activity_probability")]
    pub activity_probability: f64,

    /// Number of vertices on M at superstep 0.
    #[serde(default = "default_initial_switched")]
    pub initial_switched: u64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            switch_probability: default_switch_probability(),
            activity_probability: default_activity_probability(),
            initial_switched: default_initial_switched(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_err| ConfigError::InvalidEnv { var, value })
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{field} must be within [0, 1], got {value}"),
        })
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

fn default_run_name() -> String {
    String::from("contagion")
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_supersteps() -> u64 {
    100
}

const fn default_population() -> u64 {
    1000
}

const fn default_edge_probability() -> f64 {
    0.01
}

const fn default_neighbors() -> u32 {
    4
}

const fn default_rewire_probability() -> f64 {
    0.1
}

const fn default_infection_probability() -> f64 {
    0.1
}

const fn default_incubation_steps() -> u32 {
    5
}

const fn default_initial_infected() -> u64 {
    1
}

const fn default_switch_probability() -> f64 {
    0.5
}

const fn default_activity_probability() -> f64 {
    0.3
}

const fn default_initial_switched() -> u64 {
    10
}

fn default_log_level() -> String {
    String::from("info")
}
