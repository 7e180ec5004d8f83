//! End-to-end scenarios for both simulations on small hand-built graphs and
//! seeded random ones.

#![allow(clippy::unwrap_used, clippy::float_cmp, missing_docs)]

use std::collections::BTreeSet;

use contagion_core::config::SimulationConfig;
use contagion_core::graph::Graph;
use contagion_core::runner::{EndReason, Engine, EngineOptions};
use contagion_core::vertex::VertexRecord;
use contagion_sims::epidemic::{self, EpidemicRule, EpidemicStats, Health};
use contagion_sims::social::{self, PlatformRule, PlatformStats};
use contagion_types::{Platform, VertexId};

fn pair<V>(first: V, second: V) -> Graph<V> {
    Graph::from_records(vec![
        VertexRecord::new(VertexId(0), first, vec![VertexId(1)]),
        VertexRecord::new(VertexId(1), second, vec![VertexId(0)]),
    ])
    .unwrap()
}

fn options(max_supersteps: u64) -> EngineOptions {
    EngineOptions {
        seed: 42,
        max_supersteps: Some(max_supersteps),
    }
}

#[test]
fn single_inactive_vertex_produces_no_rows() {
    let graph = Graph::from_records(vec![
        VertexRecord::new(VertexId(0), Health::NEWLY_INFECTED, Vec::new()).with_active(false),
    ])
    .unwrap();
    let rule = EpidemicRule::new(1.0, 1).unwrap();
    let report = Engine::new(graph, options(10))
        .run(&rule, &EpidemicStats)
        .unwrap();
    assert!(report.rows.is_empty());
    assert_eq!(report.end_reason, EndReason::AllHalted);
}

#[test]
fn certain_infection_burns_through_a_pair() {
    let rule = EpidemicRule::new(1.0, 1).unwrap();
    let states = |_: u64, graph: &Graph<Health>| -> Vec<Health> {
        graph.iter().map(|v| *v.value()).collect()
    };

    let mut engine = Engine::new(pair(Health::NEWLY_INFECTED, Health::Healthy), options(20));
    let report = engine.run(&rule, &states).unwrap();

    assert_eq!(report.end_reason, EndReason::AllHalted);
    assert_eq!(
        report.rows,
        vec![
            vec![Health::Infected { steps: 2 }, Health::Healthy],
            vec![Health::Dead, Health::NEWLY_INFECTED],
            vec![Health::Dead, Health::Infected { steps: 2 }],
            vec![Health::Dead, Health::Dead],
        ]
    );
}

#[test]
fn certain_infection_alive_fraction_reaches_zero_by_round_three() {
    let rule = EpidemicRule::new(1.0, 1).unwrap();
    let mut engine = Engine::new(pair(Health::NEWLY_INFECTED, Health::Healthy), options(20));
    let report = engine.run(&rule, &EpidemicStats).unwrap();

    let alive: Vec<f64> = report.rows.iter().map(|row| row.alive).collect();
    assert_eq!(alive, vec![1.0, 0.5, 0.5, 0.0]);
    let supersteps: Vec<u64> = report.rows.iter().map(|row| row.superstep).collect();
    assert_eq!(supersteps, vec![0, 1, 2, 3]);
}

#[test]
fn majority_pressure_flips_the_follower() {
    let rule = PlatformRule::new(1.0, 1.0).unwrap();
    let mut engine = Engine::new(pair(Platform::M, Platform::F), options(4));
    let report = engine.run(&rule, &PlatformStats).unwrap();

    assert_eq!(report.end_reason, EndReason::StepCeiling);
    assert_eq!(report.forced_halts, 2);
    let on_m: Vec<f64> = report.rows.iter().map(|row| row.on_m).collect();
    assert_eq!(on_m, vec![0.5, 1.0, 1.0, 1.0]);
    assert!(engine.graph().iter().all(|v| *v.value() == Platform::M));
}

fn random_config(simulation: &str) -> SimulationConfig {
    SimulationConfig::parse(&format!(
        r"
run:
  seed: 7
  simulation: {simulation}
  max_supersteps: 40
graph:
  population: 150
  topology: erdos_renyi
  edge_probability: 0.05
epidemic:
  infection_probability: 0.4
  incubation_steps: 3
  initial_infected: 5
social:
  switch_probability: 0.6
  activity_probability: 0.5
  initial_switched: 30
"
    ))
    .unwrap()
}

#[test]
fn alive_fraction_never_increases() {
    let report = epidemic::run_epidemic(&random_config("epidemic")).unwrap();
    assert!(!report.rows.is_empty());
    for window in report.rows.windows(2) {
        if let [earlier, later] = window {
            assert!(later.alive <= earlier.alive);
        }
    }
    let first = report.rows.first().unwrap();
    assert!(first.infected > 0.0);
}

#[test]
fn epidemic_runs_are_reproducible() {
    let config = random_config("epidemic");
    let a = epidemic::run_epidemic(&config).unwrap();
    let b = epidemic::run_epidemic(&config).unwrap();
    assert_eq!(a.rows, b.rows);
    assert_eq!(a.end_reason, b.end_reason);
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn switched_vertices_never_revert() {
    let config = random_config("social");
    let topology = contagion_sims::topology::from_config(&config.graph, config.run.seed).unwrap();
    let switched: BTreeSet<VertexId> = (0..30).map(VertexId).collect();
    let graph = Graph::from_records(social::seed_records(topology, &switched)).unwrap();
    let rule = PlatformRule::new(0.6, 0.5).unwrap();

    let on_m = |_: u64, graph: &Graph<Platform>| -> BTreeSet<VertexId> {
        graph
            .iter()
            .filter(|v| *v.value() == Platform::M)
            .map(|v| v.id())
            .collect()
    };
    let report = Engine::new(graph, options(30)).run(&rule, &on_m).unwrap();

    let mut previous = switched;
    for current in report.rows {
        assert!(previous.is_subset(&current));
        previous = current;
    }
}

#[test]
fn platform_run_stops_at_the_ceiling() {
    let report = social::run_platform_switch(&random_config("social")).unwrap();
    assert_eq!(report.end_reason, EndReason::StepCeiling);
    assert_eq!(report.rows.len(), 40);
    for window in report.rows.windows(2) {
        if let [earlier, later] = window {
            assert!(later.on_m >= earlier.on_m);
        }
    }
}

#[test]
fn epidemic_without_a_ceiling_is_refused_at_load() {
    let yaml = "run:\n  simulation: epidemic\n  max_supersteps: 0\n";
    assert!(SimulationConfig::parse(yaml).is_err());
}
