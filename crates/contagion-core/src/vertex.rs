//! Vertex state owned by the engine.
//!
//! A [`Vertex`] carries the application value, its fixed out edges, and its
//! lifecycle [`VertexStatus`]. Inboxes and outboxes live in the
//! [`Mailboxes`](crate::mailbox::Mailboxes) so they can be double-buffered
//! independently of vertex storage.

use contagion_types::{VertexId, VertexStatus};

/// One vertex record as supplied by a topology generator.
///
/// This is the construction interface: neighbor ids are resolved and
/// checked when the records are turned into a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRecord<V> {
    /// Unique identifier.
    pub id: VertexId,
    /// Initial application value.
    pub value: V,
    /// Whether the vertex starts active.
    pub active: bool,
    /// Ordered out-neighbors.
    pub neighbors: Vec<VertexId>,
}

impl<V> VertexRecord<V> {
    /// Create an active record.
    pub const fn new(id: VertexId, value: V, neighbors: Vec<VertexId>) -> Self {
        Self {
            id,
            value,
            active: true,
            neighbors,
        }
    }

    /// Set the initial activity flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// A vertex inside a running graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<V> {
    id: VertexId,
    value: V,
    out_edges: Vec<VertexId>,
    status: VertexStatus,
}

impl<V> Vertex<V> {
    pub(crate) fn from_record(record: VertexRecord<V>) -> Self {
        let status = if record.active {
            VertexStatus::PendingInit
        } else {
            VertexStatus::Halted
        };
        Self {
            id: record.id,
            value: record.value,
            out_edges: record.neighbors,
            status,
        }
    }

    /// The vertex identifier.
    pub const fn id(&self) -> VertexId {
        self.id
    }

    /// The current application value.
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Ordered out-neighbors.
    pub fn out_edges(&self) -> &[VertexId] {
        &self.out_edges
    }

    /// Current lifecycle state.
    pub const fn status(&self) -> VertexStatus {
        self.status
    }

    /// Whether the vertex will be invoked in the next superstep.
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Split borrow used by the coordinator while building a compute context.
    pub(crate) fn parts_mut(&mut self) -> (VertexId, &[VertexId], &mut V) {
        (self.id, &self.out_edges, &mut self.value)
    }

    pub(crate) const fn finish_compute(&mut self, voted_to_halt: bool) {
        self.status = self.status.after_compute(voted_to_halt);
    }

    /// Force the vertex into the terminal state. Returns whether it was active.
    pub(crate) const fn force_halt(&mut self) -> bool {
        let was_active = self.status.is_active();
        self.status = VertexStatus::Halted;
        was_active
    }
}
