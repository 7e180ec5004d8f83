//! The update-rule extension point.
//!
//! Every simulation plugs into the engine through one trait,
//! [`UpdateRule`]. Once per superstep, for every active vertex, the
//! coordinator builds a [`ComputeContext`] exposing exactly the capability
//! set a vertex program is allowed:
//!
//! - read the global superstep number
//! - read the messages delivered to it this superstep
//! - read and mutate its own value
//! - vote to halt
//! - emit messages for the next superstep
//! - draw randomness from a seeded per-vertex stream
//!
//! A vertex never sees another vertex's value; everything it learns about
//! the rest of the graph arrives as messages.

use contagion_types::{Envelope, Message, VertexId};
use rand::Rng;
use rand::distr::Bernoulli;
use rand::rngs::StdRng;

/// Errors raised by an update rule. Any of them aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    /// The rule rejected the state it found.
    #[error("update rule failed at vertex {vertex}: {reason}")]
    Rule {
        /// The vertex being updated.
        vertex: VertexId,
        /// Explanation supplied by the rule.
        reason: String,
    },
}

/// A per-vertex program executed once per superstep.
///
/// Implementations hold simulation parameters by value and must be pure
/// with respect to the context: all effects go through [`ComputeContext`].
pub trait UpdateRule {
    /// Application state stored on each vertex.
    type Value;

    /// Message payload exchanged between vertices.
    type Payload;

    /// Run one superstep for one vertex.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] if the vertex cannot make progress. The
    /// engine aborts the run without recording stats for this superstep.
    fn compute(
        &self,
        ctx: &mut ComputeContext<'_, Self::Value, Self::Payload>,
    ) -> Result<(), UpdateError>;
}

/// Everything a vertex may touch during one compute call.
pub struct ComputeContext<'a, V, P> {
    superstep: u64,
    vertex_id: VertexId,
    out_edges: &'a [VertexId],
    incoming: &'a [Message<P>],
    value: &'a mut V,
    outbox: &'a mut Vec<Envelope<P>>,
    rng: &'a mut StdRng,
    voted_to_halt: bool,
}

impl<'a, V, P> ComputeContext<'a, V, P> {
    /// Assemble a context. The coordinator calls this; rules and tests
    /// may call it to drive a single compute step by hand.
    pub const fn new(
        superstep: u64,
        vertex_id: VertexId,
        out_edges: &'a [VertexId],
        incoming: &'a [Message<P>],
        value: &'a mut V,
        outbox: &'a mut Vec<Envelope<P>>,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            superstep,
            vertex_id,
            out_edges,
            incoming,
            value,
            outbox,
            rng,
            voted_to_halt: false,
        }
    }

    /// The global superstep number, identical for every vertex.
    pub const fn superstep(&self) -> u64 {
        self.superstep
    }

    /// The id of the vertex being computed.
    pub const fn vertex_id(&self) -> VertexId {
        self.vertex_id
    }

    /// Ordered out-neighbors.
    pub const fn out_edges(&self) -> &[VertexId] {
        self.out_edges
    }

    /// Messages sent to this vertex during the previous superstep.
    pub const fn incoming(&self) -> &[Message<P>] {
        self.incoming
    }

    /// The vertex's current value.
    pub const fn value(&self) -> &V {
        &*self.value
    }

    /// Mutable access to the vertex's value.
    pub const fn value_mut(&mut self) -> &mut V {
        &mut *self.value
    }

    /// Replace the vertex's value.
    pub fn set_value(&mut self, value: V) {
        *self.value = value;
    }

    /// The vertex's random stream for this superstep.
    pub const fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    /// Queue a message for `destination`, readable next superstep.
    ///
    /// The destination is checked by the coordinator once the compute call
    /// returns; an unknown id aborts the run.
    pub fn send(&mut self, destination: VertexId, weight: f64, payload: P) {
        self.outbox
            .push(Envelope::new(self.vertex_id, destination, weight, payload));
    }

    /// Number of messages queued by this compute call so far.
    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    /// Declare this vertex permanently inactive after the current call.
    ///
    /// Messages already queued are still delivered.
    pub const fn vote_to_halt(&mut self) {
        self.voted_to_halt = true;
    }

    /// Whether [`vote_to_halt`](Self::vote_to_halt) was called.
    pub const fn voted_to_halt(&self) -> bool {
        self.voted_to_halt
    }

    /// Build an [`UpdateError::Rule`] for this vertex.
    pub fn error(&self, reason: impl Into<String>) -> UpdateError {
        UpdateError::Rule {
            vertex: self.vertex_id,
            reason: reason.into(),
        }
    }
}

impl<V, P: Clone> ComputeContext<'_, V, P> {
    /// Send one copy of `payload` along every out edge, in edge order.
    pub fn send_to_neighbors(&mut self, weight: f64, payload: &P) {
        for &neighbor in self.out_edges {
            self.outbox.push(Envelope::new(
                self.vertex_id,
                neighbor,
                weight,
                payload.clone(),
            ));
        }
    }

    /// Send `payload` along each out edge independently with the given
    /// chance. Returns the number of messages queued.
    ///
    /// One trial is drawn per edge, in edge order, from this vertex's
    /// random stream.
    pub fn send_to_neighbors_with(&mut self, chance: Bernoulli, weight: f64, payload: &P) -> usize {
        let mut sent: usize = 0;
        for &neighbor in self.out_edges {
            if self.rng.sample(chance) {
                self.outbox.push(Envelope::new(
                    self.vertex_id,
                    neighbor,
                    weight,
                    payload.clone(),
                ));
                sent = sent.saturating_add(1);
            }
        }
        sent
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn send_tags_source_and_destination() {
        let mut value = 0_u32;
        let mut outbox = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let edges = [VertexId(2), VertexId(3)];
        let mut ctx =
            ComputeContext::new(4, VertexId(1), &edges, &[], &mut value, &mut outbox, &mut rng);

        ctx.send(VertexId(3), 0.5, "x");
        assert_eq!(ctx.outbox_len(), 1);
        assert_eq!(ctx.superstep(), 4);
        drop(ctx);

        let envelope = outbox.first().cloned();
        assert_eq!(
            envelope,
            Some(Envelope::new(VertexId(1), VertexId(3), 0.5, "x"))
        );
    }

    #[test]
    fn send_to_neighbors_follows_edge_order() {
        let mut value = ();
        let mut outbox = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let edges = [VertexId(9), VertexId(4)];
        let mut ctx =
            ComputeContext::new(0, VertexId(1), &edges, &[], &mut value, &mut outbox, &mut rng);
        ctx.send_to_neighbors(1.0, &'m');
        drop(ctx);

        let destinations: Vec<VertexId> = outbox.iter().map(|e| e.destination).collect();
        assert_eq!(destinations, vec![VertexId(9), VertexId(4)]);
    }

    #[test]
    fn certain_and_impossible_chances() {
        let mut value = ();
        let mut outbox = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let edges = [VertexId(2), VertexId(3), VertexId(4)];
        let mut ctx =
            ComputeContext::new(0, VertexId(1), &edges, &[], &mut value, &mut outbox, &mut rng);
        let always = Bernoulli::new(1.0).unwrap();
        let never = Bernoulli::new(0.0).unwrap();
        assert_eq!(ctx.send_to_neighbors_with(never, 1.0, &0_u8), 0);
        assert_eq!(ctx.send_to_neighbors_with(always, 1.0, &0_u8), 3);
        assert_eq!(ctx.outbox_len(), 3);
    }

    #[test]
    fn value_and_halt_are_recorded() {
        let mut value = 1_i32;
        let mut outbox: Vec<Envelope<()>> = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx =
            ComputeContext::new(0, VertexId(1), &[], &[], &mut value, &mut outbox, &mut rng);
        *ctx.value_mut() += 1;
        ctx.vote_to_halt();
        assert!(ctx.voted_to_halt());
        assert_eq!(*ctx.value(), 2);
        let err = ctx.error("bad state");
        assert_eq!(
            err,
            UpdateError::Rule {
                vertex: VertexId(1),
                reason: String::from("bad state"),
            }
        );
    }
}
