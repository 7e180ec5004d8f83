//! Command-line entry point for the Contagion simulations.
//!
//! Loads `contagion-config.yaml`, generates the configured topology, runs
//! the selected simulation on the BSP engine and writes one JSON object per
//! completed superstep to stdout. Logs go to stderr.
//!
//! # Startup sequence
//!
//! 1. Load configuration from `$CONTAGION_CONFIG` or `contagion-config.yaml`
//! 2. Initialize structured logging (`RUST_LOG` overrides `logging.level`)
//! 3. Run the simulation named by `run.simulation`
//! 4. Stream the stats series as JSON lines

mod error;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use contagion_core::config::{LoggingConfig, SimulationConfig, SimulationKind};
use contagion_core::runner::RunReport;
use contagion_sims::{epidemic, social};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "CONTAGION_CONFIG";

/// Config file read when `CONTAGION_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "contagion-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the run, or writing output fails.
fn main() -> Result<(), CliError> {
    // 1. Load configuration (before logging, which it configures).
    let (config, config_path, found) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("contagion starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        name = config.run.name,
        simulation = ?config.run.simulation,
        seed = config.run.seed,
        max_supersteps = config.run.max_supersteps,
        population = config.graph.population,
        topology = ?config.graph.topology,
        "Run configured"
    );

    // 3. Run the selected simulation.
    // 4. Stream its rows.
    match config.run.simulation {
        SimulationKind::Epidemic => write_rows(&epidemic::run_epidemic(&config)?),
        SimulationKind::Social => write_rows(&social::run_platform_switch(&config)?),
    }
}

/// Resolve the config path and load it, falling back to defaults when the
/// file does not exist. Environment overrides apply either way.
fn load_config() -> Result<(SimulationConfig, PathBuf, bool), CliError> {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, path, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok((config, path, false))
    }
}

/// Install the global tracing subscriber on stderr.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Write every row of `report` to stdout as one JSON object per line.
fn write_rows<Row: Serialize>(report: &RunReport<Row>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in &report.rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(
        run_id = %report.run_id,
        rows = report.rows.len(),
        end_reason = ?report.end_reason,
        elapsed_ms = report.elapsed_ms,
        "Stats written"
    );
    Ok(())
}
