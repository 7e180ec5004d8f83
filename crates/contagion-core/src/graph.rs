//! The immutable-topology vertex set a run operates on.
//!
//! A [`Graph`] is built once from [`VertexRecord`]s. Construction sorts the
//! vertices by id (the engine's visiting order), rejects duplicate ids, and
//! rejects edges pointing at vertices that do not exist. After construction
//! the vertex set and edges never change; only values and lifecycle states
//! are mutated, by the coordinator, during a run.

use std::collections::BTreeMap;

use contagion_types::VertexId;

use crate::vertex::{Vertex, VertexRecord};

/// Errors detected while building a graph. All are fatal and reported
/// before any superstep runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two records share the same id.
    #[error("duplicate vertex id: {0}")]
    DuplicateVertex(VertexId),

    /// A record lists a neighbor that is not part of the graph.
    #[error("vertex {from} has an edge to unknown vertex {to}")]
    DanglingEdge {
        /// The vertex owning the edge.
        from: VertexId,
        /// The missing neighbor.
        to: VertexId,
    },
}

/// A validated vertex set with fixed topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph<V> {
    /// Vertices in ascending id order.
    vertices: Vec<Vertex<V>>,
    /// Vertex id -> position in `vertices`.
    index: BTreeMap<VertexId, usize>,
}

impl<V> Graph<V> {
    /// Build a graph from construction records.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateVertex`] if two records share an id,
    /// or [`GraphError::DanglingEdge`] if a neighbor id is unknown.
    pub fn from_records<I>(records: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = VertexRecord<V>>,
    {
        let mut records: Vec<VertexRecord<V>> = records.into_iter().collect();
        records.sort_by_key(|record| record.id);

        let mut index = BTreeMap::new();
        for (position, record) in records.iter().enumerate() {
            if index.insert(record.id, position).is_some() {
                return Err(GraphError::DuplicateVertex(record.id));
            }
        }

        for record in &records {
            if let Some(&missing) = record
                .neighbors
                .iter()
                .find(|neighbor| !index.contains_key(*neighbor))
            {
                return Err(GraphError::DanglingEdge {
                    from: record.id,
                    to: missing,
                });
            }
        }

        let vertices = records.into_iter().map(Vertex::from_record).collect();
        Ok(Self { vertices, index })
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.vertices.iter().map(|v| v.out_edges().len()).sum()
    }

    /// Look up a vertex by id.
    pub fn get(&self, id: VertexId) -> Option<&Vertex<V>> {
        self.index_of(id).and_then(|position| self.vertices.get(position))
    }

    /// Position of a vertex in id order.
    pub fn index_of(&self, id: VertexId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// All vertices in ascending id order.
    pub fn vertices(&self) -> &[Vertex<V>] {
        &self.vertices
    }

    /// Iterate over vertices in ascending id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Vertex<V>> {
        self.vertices.iter()
    }

    /// Number of vertices that will be invoked in the next superstep.
    pub fn active_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_active()).count()
    }

    /// Out-degree of every vertex, in id order.
    pub fn out_degrees(&self) -> Vec<usize> {
        self.vertices.iter().map(|v| v.out_edges().len()).collect()
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [Vertex<V>] {
        &mut self.vertices
    }
}

impl<'a, V> IntoIterator for &'a Graph<V> {
    type Item = &'a Vertex<V>;
    type IntoIter = std::slice::Iter<'a, Vertex<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}
