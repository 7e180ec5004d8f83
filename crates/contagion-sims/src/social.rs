//! Platform switching driven by neighbor majority.
//!
//! Every vertex carries a [`Platform`] label. Each superstep a vertex still
//! on `F` counts the labels it received; if `M` strictly outnumbers `F` it
//! switches with probability `sp`. Every vertex then re-broadcasts its
//! current label along each out edge with probability `a`. Nobody ever
//! switches back, and nobody votes to halt, so runs end at the step
//! ceiling.

use std::collections::BTreeSet;

use contagion_core::compute::{ComputeContext, UpdateError, UpdateRule};
use contagion_core::config::SimulationConfig;
use contagion_core::graph::Graph;
use contagion_core::runner::{Engine, EngineOptions, RunReport};
use contagion_core::stats::{StatsCollector, fraction};
use contagion_core::vertex::VertexRecord;
use contagion_types::{Platform, VertexId};
use rand::Rng;
use rand::distr::Bernoulli;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SimError;
use crate::sampling::{chance, choose_seeds};
use crate::topology::{self, Topology};

/// Platform-switching update rule.
#[derive(Debug, Clone, Copy)]
pub struct PlatformRule {
    switch: Bernoulli,
    activity: Bernoulli,
}

impl PlatformRule {
    /// Build a rule with switch probability `sp` and activity probability `a`.
    pub fn new(switch_probability: f64, activity_probability: f64) -> Result<Self, SimError> {
        Ok(Self {
            switch: chance("switch_probability", switch_probability)?,
            activity: chance("activity_probability", activity_probability)?,
        })
    }
}

impl UpdateRule for PlatformRule {
    type Value = Platform;
    type Payload = Platform;

    fn compute(&self, ctx: &mut ComputeContext<'_, Platform, Platform>) -> Result<(), UpdateError> {
        if *ctx.value() == Platform::F {
            let on_m = ctx
                .incoming()
                .iter()
                .filter(|message| message.payload == Platform::M)
                .count();
            let on_f = ctx.incoming().len().saturating_sub(on_m);
            if on_m > on_f && ctx.rng().sample(self.switch) {
                ctx.set_value(Platform::M);
            }
        }

        let label = *ctx.value();
        ctx.send_to_neighbors_with(self.activity, 1.0, &label);
        Ok(())
    }
}

/// One row of the platform time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformRow {
    /// The superstep that just completed.
    pub superstep: u64,
    /// Fraction of vertices on F.
    pub on_f: f64,
    /// Fraction of vertices on M.
    pub on_m: f64,
}

/// Collects a [`PlatformRow`] per superstep.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformStats;

impl StatsCollector<Platform> for PlatformStats {
    type Row = PlatformRow;

    fn collect(&self, superstep: u64, graph: &Graph<Platform>) -> PlatformRow {
        let total = graph.len();
        let on_m = graph
            .iter()
            .filter(|vertex| *vertex.value() == Platform::M)
            .count();
        PlatformRow {
            superstep,
            on_f: fraction(total.saturating_sub(on_m), total),
            on_m: fraction(on_m, total),
        }
    }
}

/// Vertex records with `switched` starting on M and everyone else on F.
pub fn seed_records(topology: Topology, switched: &BTreeSet<VertexId>) -> Vec<VertexRecord<Platform>> {
    topology.into_records(|id| {
        if switched.contains(&id) {
            Platform::M
        } else {
            Platform::F
        }
    })
}

/// Build the configured topology, seed the early adopters and run until
/// the step ceiling.
pub fn run_platform_switch(config: &SimulationConfig) -> Result<RunReport<PlatformRow>, SimError> {
    let rule = PlatformRule::new(
        config.social.switch_probability,
        config.social.activity_probability,
    )?;
    let topology = topology::from_config(&config.graph, config.run.seed)?;
    let switched = choose_seeds(topology.len(), config.social.initial_switched, config.run.seed)?;
    let graph = Graph::from_records(seed_records(topology, &switched))?;

    info!(
        population = graph.len(),
        edges = graph.edge_count(),
        initial_switched = switched.len(),
        "Platform switch seeded"
    );
    if config.run.step_ceiling().is_none() {
        warn!("Platform switch vertices never halt; the run is unbounded without max_supersteps");
    }

    let options = EngineOptions {
        seed: config.run.seed,
        max_supersteps: config.run.step_ceiling(),
    };
    let mut engine = Engine::new(graph, options);
    Ok(engine.run(&rule, &PlatformStats)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use contagion_types::Message;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn step(rule: &PlatformRule, label: Platform, heard: &[Platform]) -> (Platform, Vec<Platform>) {
        let mut value = label;
        let mut outbox = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        let edges = [VertexId(1), VertexId(2)];
        let incoming: Vec<Message<Platform>> = heard
            .iter()
            .map(|&payload| Message {
                source: VertexId(1),
                weight: 1.0,
                payload,
            })
            .collect();
        let mut ctx = ComputeContext::new(
            3,
            VertexId(0),
            &edges,
            &incoming,
            &mut value,
            &mut outbox,
            &mut rng,
        );
        rule.compute(&mut ctx).unwrap();
        assert!(!ctx.voted_to_halt());
        drop(ctx);
        (value, outbox.into_iter().map(|e| e.message.payload).collect())
    }

    #[test]
    fn strict_majority_switches() {
        let rule = PlatformRule::new(1.0, 1.0).unwrap();
        let (label, sent) = step(&rule, Platform::F, &[Platform::M, Platform::M, Platform::F]);
        assert_eq!(label, Platform::M);
        assert_eq!(sent, vec![Platform::M, Platform::M]);
    }

    #[test]
    fn tie_does_not_switch() {
        let rule = PlatformRule::new(1.0, 1.0).unwrap();
        let (label, _) = step(&rule, Platform::F, &[Platform::M, Platform::F]);
        assert_eq!(label, Platform::F);
        assert_eq!(step(&rule, Platform::F, &[]).0, Platform::F);
    }

    #[test]
    fn zero_switch_probability_holds_on_f() {
        let rule = PlatformRule::new(0.0, 1.0).unwrap();
        assert_eq!(step(&rule, Platform::F, &[Platform::M]).0, Platform::F);
    }

    #[test]
    fn m_never_reverts() {
        let rule = PlatformRule::new(1.0, 1.0).unwrap();
        let (label, _) = step(&rule, Platform::M, &[Platform::F, Platform::F, Platform::F]);
        assert_eq!(label, Platform::M);
    }

    #[test]
    fn inactive_vertices_stay_quiet() {
        let rule = PlatformRule::new(1.0, 0.0).unwrap();
        assert!(step(&rule, Platform::M, &[]).1.is_empty());
    }

    #[test]
    fn stats_split_population() {
        let graph = Graph::from_records(vec![
            VertexRecord::new(VertexId(0), Platform::M, Vec::new()),
            VertexRecord::new(VertexId(1), Platform::F, Vec::new()),
            VertexRecord::new(VertexId(2), Platform::F, Vec::new()),
            VertexRecord::new(VertexId(3), Platform::F, Vec::new()),
        ])
        .unwrap();
        let row = PlatformStats.collect(1, &graph);
        assert_eq!(row.on_m, 0.25);
        assert_eq!(row.on_f, 0.75);
    }
}
