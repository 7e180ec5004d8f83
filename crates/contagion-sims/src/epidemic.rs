//! SIR-style epidemic with a fixed incubation window.
//!
//! Every vertex is in exactly one [`Health`] state per superstep:
//!
//! - **Healthy**: one infection trial per incoming [`Infection`] message,
//!   in arrival order, stopping at the first success. A vertex infected
//!   this way becomes `Infected { steps: 1 }` and sends nothing until the
//!   next superstep.
//! - **Infected** with `steps <= incubation`: sends an infection message
//!   along each out edge with probability `p`, then ages by one step.
//!   Incoming messages are ignored.
//! - **Infected** with `steps > incubation`: dies and votes to halt
//!   without sending.
//! - **Dead**: halted; never invoked again.
//!
//! Death is permanent, so the alive fraction reported by [`EpidemicStats`]
//! never increases.

use std::collections::BTreeSet;

use contagion_core::compute::{ComputeContext, UpdateError, UpdateRule};
use contagion_core::config::SimulationConfig;
use contagion_core::graph::Graph;
use contagion_core::runner::{Engine, EngineOptions, RunReport};
use contagion_core::stats::{StatsCollector, fraction};
use contagion_core::vertex::VertexRecord;
use contagion_types::VertexId;
use rand::Rng;
use rand::distr::Bernoulli;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SimError;
use crate::sampling::{chance, choose_seeds};
use crate::topology::{self, Topology};

// ---------------------------------------------------------------------------
// State and payload
// ---------------------------------------------------------------------------

/// Health of one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Health {
    /// Susceptible.
    Healthy,
    /// Infected for `steps` supersteps, counting the superstep of infection
    /// as 1.
    Infected {
        /// Supersteps since infection, at least 1.
        steps: u32,
    },
    /// Deceased. Terminal.
    Dead,
}

impl Health {
    /// A freshly infected vertex.
    pub const NEWLY_INFECTED: Self = Self::Infected { steps: 1 };

    /// Whether the vertex is healthy or infected.
    pub const fn is_alive(self) -> bool {
        !matches!(self, Self::Dead)
    }

    /// Whether the vertex is infected.
    pub const fn is_infected(self) -> bool {
        matches!(self, Self::Infected { .. })
    }
}

/// Payload of an infection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Infection;

// ---------------------------------------------------------------------------
// Update rule
// ---------------------------------------------------------------------------

/// Epidemic update rule.
#[derive(Debug, Clone, Copy)]
pub struct EpidemicRule {
    contact: Bernoulli,
    incubation_steps: u32,
}

impl EpidemicRule {
    /// Build a rule with per-contact infection probability `p` and an
    /// incubation window of `incubation_steps` supersteps.
    pub fn new(infection_probability: f64, incubation_steps: u32) -> Result<Self, SimError> {
        if incubation_steps == 0 {
            return Err(SimError::ZeroIncubation);
        }
        Ok(Self {
            contact: chance("infection_probability", infection_probability)?,
            incubation_steps,
        })
    }

    /// Length of the infectious window.
    pub const fn incubation_steps(&self) -> u32 {
        self.incubation_steps
    }
}

impl UpdateRule for EpidemicRule {
    type Value = Health;
    type Payload = Infection;

    fn compute(&self, ctx: &mut ComputeContext<'_, Health, Infection>) -> Result<(), UpdateError> {
        match *ctx.value() {
            Health::Healthy => {
                let exposures = ctx.incoming().len();
                let contact = self.contact;
                if (0..exposures).any(|_| ctx.rng().sample(contact)) {
                    ctx.set_value(Health::NEWLY_INFECTED);
                }
            }
            Health::Infected { steps } if steps > self.incubation_steps => {
                ctx.set_value(Health::Dead);
                ctx.vote_to_halt();
            }
            Health::Infected { steps } => {
                ctx.send_to_neighbors_with(self.contact, 1.0, &Infection);
                let aged = steps
                    .checked_add(1)
                    .ok_or_else(|| ctx.error("infection age overflow"))?;
                ctx.set_value(Health::Infected { steps: aged });
            }
            Health::Dead => ctx.vote_to_halt(),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// One row of the epidemic time series. Fractions are of the whole
/// population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpidemicRow {
    /// The superstep that just completed.
    pub superstep: u64,
    /// Healthy or infected.
    pub alive: f64,
    /// Currently infected.
    pub infected: f64,
    /// Never infected.
    pub healthy: f64,
}

/// Collects an [`EpidemicRow`] per superstep.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpidemicStats;

impl StatsCollector<Health> for EpidemicStats {
    type Row = EpidemicRow;

    fn collect(&self, superstep: u64, graph: &Graph<Health>) -> EpidemicRow {
        let total = graph.len();
        let count = |pred: fn(Health) -> bool| graph.iter().filter(|v| pred(*v.value())).count();
        EpidemicRow {
            superstep,
            alive: fraction(count(Health::is_alive), total),
            infected: fraction(count(Health::is_infected), total),
            healthy: fraction(count(|h| h == Health::Healthy), total),
        }
    }
}

// ---------------------------------------------------------------------------
// Seeding and R0
// ---------------------------------------------------------------------------

/// Vertex records with `infected` starting as newly infected and everyone
/// else healthy.
pub fn seed_records(topology: Topology, infected: &BTreeSet<VertexId>) -> Vec<VertexRecord<Health>> {
    topology.into_records(|id| {
        if infected.contains(&id) {
            Health::NEWLY_INFECTED
        } else {
            Health::Healthy
        }
    })
}

/// Probability that an infected vertex eventually infects a given
/// neighbor over its incubation window: `1 - (1 - p^2)^incubation`.
pub fn transmissibility(infection_probability: f64, incubation_steps: u32) -> f64 {
    let exponent = i32::try_from(incubation_steps).unwrap_or(i32::MAX);
    let miss = infection_probability.mul_add(-infection_probability, 1.0);
    1.0 - miss.powi(exponent)
}

/// Basic reproduction number `T * (<k^2> - <k>) / <k>` from the out-degree
/// distribution. A graph without edges has `R0 = 0`.
#[allow(clippy::cast_precision_loss)]
pub fn basic_reproduction_number<V>(graph: &Graph<V>, transmissibility: f64) -> f64 {
    let degrees = graph.out_degrees();
    let total: usize = degrees.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = degrees.len() as f64;
    let mean = total as f64 / n;
    let mean_square = degrees
        .iter()
        .map(|&k| {
            let k = k as f64;
            k * k
        })
        .sum::<f64>()
        / n;
    transmissibility * (mean_square - mean) / mean
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Build the configured topology, seed the initial infections and run the
/// epidemic to completion.
pub fn run_epidemic(config: &SimulationConfig) -> Result<RunReport<EpidemicRow>, SimError> {
    let rule = EpidemicRule::new(
        config.epidemic.infection_probability,
        config.epidemic.incubation_steps,
    )?;
    let topology = topology::from_config(&config.graph, config.run.seed)?;
    let infected = choose_seeds(topology.len(), config.epidemic.initial_infected, config.run.seed)?;
    let graph = Graph::from_records(seed_records(topology, &infected))?;

    let r0 = basic_reproduction_number(
        &graph,
        transmissibility(
            config.epidemic.infection_probability,
            config.epidemic.incubation_steps,
        ),
    );
    info!(
        population = graph.len(),
        edges = graph.edge_count(),
        initial_infected = infected.len(),
        incubation_steps = rule.incubation_steps(),
        r0,
        "Epidemic seeded"
    );
    if config.run.step_ceiling().is_none() {
        warn!("Healthy vertices never halt; the run is unbounded without max_supersteps");
    }

    let options = EngineOptions {
        seed: config.run.seed,
        max_supersteps: config.run.step_ceiling(),
    };
    let mut engine = Engine::new(graph, options);
    Ok(engine.run(&rule, &EpidemicStats)?)
}
