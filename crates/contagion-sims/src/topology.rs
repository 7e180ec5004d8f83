//! Seeded random graph generators.
//!
//! Both models produce undirected graphs: every edge is stored in both
//! directions, there are no self loops or duplicate edges, and each
//! neighbor list is sorted by id. Vertex ids are dense, `0..population`.
//!
//! - [`erdos_renyi`] -- `G(n, p)`: each unordered pair is joined
//!   independently with probability `p`.
//! - [`watts_strogatz`] -- ring lattice of even degree `k`, each lattice
//!   edge rewired to a uniformly chosen new endpoint with probability
//!   `beta`.

use std::collections::BTreeSet;

use contagion_core::config::{GraphConfig, TopologyKind};
use contagion_core::vertex::VertexRecord;
use contagion_types::VertexId;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::SimError;
use crate::sampling::chance;

/// An undirected graph over dense vertex ids, ready to be turned into
/// engine vertex records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    adjacency: Vec<BTreeSet<usize>>,
}

impl Topology {
    /// A graph of `population` isolated vertices.
    pub fn empty(population: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); population],
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Whether `a` and `b` are joined.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency.get(a).is_some_and(|set| set.contains(&b))
    }

    /// Join `a` and `b`. Self loops, duplicates and out-of-range endpoints
    /// are ignored. Returns whether an edge was added.
    pub fn connect(&mut self, a: usize, b: usize) -> bool {
        if a == b || b >= self.len() || self.has_edge(a, b) {
            return false;
        }
        let inserted = self.adjacency.get_mut(a).is_some_and(|set| set.insert(b));
        if inserted && let Some(set) = self.adjacency.get_mut(b) {
            set.insert(a);
        }
        inserted
    }

    /// Remove the edge between `a` and `b`. Returns whether it existed.
    pub fn disconnect(&mut self, a: usize, b: usize) -> bool {
        let removed = self.adjacency.get_mut(a).is_some_and(|set| set.remove(&b));
        if removed && let Some(set) = self.adjacency.get_mut(b) {
            set.remove(&a);
        }
        removed
    }

    /// Convert into engine records, assigning each vertex its initial value.
    pub fn into_records<V, F>(self, mut value: F) -> Vec<VertexRecord<V>>
    where
        F: FnMut(VertexId) -> V,
    {
        self.adjacency
            .into_iter()
            .zip(0_u64..)
            .map(|(set, raw)| {
                let id = VertexId(raw);
                VertexRecord::new(id, value(id), to_ids(&set))
            })
            .collect()
    }
}

fn to_ids(set: &BTreeSet<usize>) -> Vec<VertexId> {
    set.iter()
        .filter_map(|&n| u64::try_from(n).ok())
        .map(VertexId)
        .collect()
}

fn population_size(population: u64) -> Result<usize, SimError> {
    usize::try_from(population).map_err(|_overflow| SimError::PopulationTooLarge(population))
}

/// Erdos-Renyi `G(n, p)` random graph.
pub fn erdos_renyi(population: u64, edge_probability: f64, seed: u64) -> Result<Topology, SimError> {
    let n = population_size(population)?;
    let edge = chance("edge_probability", edge_probability)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut topology = Topology::empty(n);

    for a in 0..n {
        for b in a.saturating_add(1)..n {
            if rng.sample(edge) {
                topology.connect(a, b);
            }
        }
    }

    debug!(
        population = n,
        edge_probability,
        edges = topology.edge_count(),
        "Generated Erdos-Renyi graph"
    );
    Ok(topology)
}

/// Watts-Strogatz small-world graph.
///
/// `neighbors` is the lattice degree `k` and must be even and smaller than
/// the population. Rewiring keeps the edge count fixed; an edge whose
/// source is already joined to every other vertex is left in place.
pub fn watts_strogatz(
    population: u64,
    neighbors: u32,
    rewire_probability: f64,
    seed: u64,
) -> Result<Topology, SimError> {
    let n = population_size(population)?;
    let rewire = chance("rewire_probability", rewire_probability)?;
    let k = usize::try_from(neighbors).map_err(|_overflow| SimError::InvalidTopology {
        reason: format!("lattice degree {neighbors} is too large"),
    })?;
    if k % 2 != 0 {
        return Err(SimError::InvalidTopology {
            reason: format!("lattice degree {k} must be even"),
        });
    }
    if k >= n && k > 0 {
        return Err(SimError::InvalidTopology {
            reason: format!("lattice degree {k} must be smaller than population {n}"),
        });
    }
    let half = k / 2;

    let mut topology = Topology::empty(n);
    for a in 0..n {
        for offset in 1..=half {
            if let Some(b) = ring_neighbor(a, offset, n) {
                topology.connect(a, b);
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rewired: usize = 0;
    for offset in 1..=half {
        for a in 0..n {
            let Some(b) = ring_neighbor(a, offset, n) else {
                continue;
            };
            if !rng.sample(rewire) || !topology.has_edge(a, b) {
                continue;
            }
            let candidates: Vec<usize> = (0..n)
                .filter(|&c| c != a && !topology.has_edge(a, c))
                .collect();
            if let Some(&c) = candidates.choose(&mut rng) {
                topology.disconnect(a, b);
                topology.connect(a, c);
                rewired = rewired.saturating_add(1);
            }
        }
    }

    debug!(
        population = n,
        neighbors = k,
        rewire_probability,
        rewired,
        edges = topology.edge_count(),
        "Generated Watts-Strogatz graph"
    );
    Ok(topology)
}

fn ring_neighbor(vertex: usize, offset: usize, population: usize) -> Option<usize> {
    vertex.checked_add(offset)?.checked_rem(population)
}

/// Generate the topology described by `config`.
pub fn from_config(config: &GraphConfig, seed: u64) -> Result<Topology, SimError> {
    match config.topology {
        TopologyKind::ErdosRenyi => erdos_renyi(config.population, config.edge_probability, seed),
        TopologyKind::WattsStrogatz => watts_strogatz(
            config.population,
            config.neighbors,
            config.rewire_probability,
            seed,
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn is_symmetric(topology: &Topology) -> bool {
        (0..topology.len()).all(|a| {
            (0..topology.len()).all(|b| topology.has_edge(a, b) == topology.has_edge(b, a))
        })
    }

    #[test]
    fn connect_ignores_self_loops_and_duplicates() {
        let mut topology = Topology::empty(3);
        assert!(topology.connect(0, 1));
        assert!(!topology.connect(1, 0));
        assert!(!topology.connect(2, 2));
        assert!(!topology.connect(0, 9));
        assert_eq!(topology.edge_count(), 1);
    }

    #[test]
    fn erdos_renyi_extremes() {
        assert_eq!(erdos_renyi(6, 0.0, 1).unwrap().edge_count(), 0);
        assert_eq!(erdos_renyi(6, 1.0, 1).unwrap().edge_count(), 15);
    }

    #[test]
    fn erdos_renyi_is_seeded_and_symmetric() {
        let a = erdos_renyi(40, 0.2, 11).unwrap();
        let b = erdos_renyi(40, 0.2, 11).unwrap();
        assert_eq!(a, b);
        assert!(is_symmetric(&a));
    }

    #[test]
    fn erdos_renyi_rejects_bad_probability() {
        assert!(matches!(
            erdos_renyi(5, 2.0, 1),
            Err(SimError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn unrewired_lattice_is_regular() {
        let ring = watts_strogatz(10, 4, 0.0, 1).unwrap();
        assert!((0..10).all(|a| (0..10).filter(|&b| ring.has_edge(a, b)).count() == 4));
        assert_eq!(ring.edge_count(), 20);
        let first: Vec<usize> = (0..10).filter(|&b| ring.has_edge(0, b)).collect();
        assert_eq!(first, vec![1, 2, 8, 9]);
    }

    #[test]
    fn rewiring_keeps_edge_count() {
        let graph = watts_strogatz(30, 4, 0.5, 5).unwrap();
        assert_eq!(graph.edge_count(), 60);
        assert!(is_symmetric(&graph));
        assert_ne!(graph, watts_strogatz(30, 4, 0.0, 5).unwrap());
    }

    #[test]
    fn watts_strogatz_validates_degree() {
        assert!(watts_strogatz(10, 3, 0.1, 1).is_err());
        assert!(watts_strogatz(4, 4, 0.1, 1).is_err());
        assert_eq!(watts_strogatz(1, 0, 0.1, 1).unwrap().edge_count(), 0);
    }

    #[test]
    fn records_carry_sorted_neighbors() {
        let mut topology = Topology::empty(3);
        topology.connect(0, 2);
        topology.connect(0, 1);
        let records = topology.into_records(|id| id.0.saturating_mul(10));
        let first = records.first().unwrap();
        assert_eq!(first.neighbors, vec![VertexId(1), VertexId(2)]);
        assert_eq!(records.get(2).map(|r| r.value), Some(20));
    }
}
