//! One synchronous BSP round.
//!
//! Each superstep runs through these phases:
//!
//! 1. **Compute** -- every active vertex, in ascending id order, is handed a
//!    [`ComputeContext`] over its inbox, value and a fresh outbox. Emitted
//!    messages are resolved to destination positions as soon as the call
//!    returns.
//!
//! 2. **Redistribute** -- once every active vertex has run, resolved
//!    messages are posted to the pending side of the destination mailbox.
//!    Messages addressed to a halted vertex are discarded.
//!
//! 3. **Barrier** -- pending buffers become next superstep's inboxes and the
//!    inboxes that were just read are emptied.
//!
//! Stats collection, the step counter and termination live in the
//! [`runner`](crate::runner); this module never looks beyond one round.
//!
//! A failing update aborts the round before redistribution, so no message
//! from a failed round is ever delivered.

use contagion_types::{Message, VertexId};
use tracing::trace;

use crate::compute::{ComputeContext, UpdateError, UpdateRule};
use crate::graph::Graph;
use crate::mailbox::Mailboxes;
use crate::rng::vertex_rng;

/// Errors that abort a superstep.
#[derive(Debug, thiserror::Error)]
pub enum SuperstepError {
    /// An update rule returned an error.
    #[error("update failed in superstep {superstep}: {source}")]
    Update {
        /// The superstep being executed.
        superstep: u64,
        /// The underlying rule error.
        source: UpdateError,
    },

    /// A vertex addressed a message to an id that is not in the graph.
    #[error("vertex {sender} sent a message to unknown vertex {destination} in superstep {superstep}")]
    UnknownDestination {
        /// The superstep being executed.
        superstep: u64,
        /// The vertex that emitted the message.
        sender: VertexId,
        /// The missing destination.
        destination: VertexId,
    },
}

/// Summary of a single superstep's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuperstepSummary {
    /// The superstep number that was executed.
    pub superstep: u64,
    /// Number of vertices whose update rule was invoked.
    pub invoked: usize,
    /// Number of vertices that voted to halt during this superstep.
    pub halted: usize,
    /// Number of messages emitted.
    pub messages_sent: usize,
    /// Number of messages readable in the next superstep.
    pub messages_delivered: usize,
    /// Number of messages dropped because their destination is halted.
    pub messages_discarded: usize,
}

/// Execute one complete superstep.
///
/// `seed` is the run seed; each vertex receives the stream
/// [`vertex_rng`]`(seed, superstep, id)`.
///
/// # Errors
///
/// Returns [`SuperstepError`] if any update rule fails or emits a message to
/// an unknown vertex. The mailboxes are left without this round's
/// deliveries; vertices computed before the failure keep their new values.
pub fn run_superstep<R>(
    graph: &mut Graph<R::Value>,
    mailboxes: &mut Mailboxes<R::Payload>,
    rule: &R,
    superstep: u64,
    seed: u64,
) -> Result<SuperstepSummary, SuperstepError>
where
    R: UpdateRule + ?Sized,
{
    let mut summary = SuperstepSummary {
        superstep,
        ..SuperstepSummary::default()
    };

    // --- Phase 1: Compute ---
    let mut deliveries: Vec<(usize, Message<R::Payload>)> = Vec::new();
    let mut outbox = Vec::new();

    for position in 0..graph.len() {
        let Some(vertex) = graph.vertices_mut().get_mut(position) else {
            continue;
        };
        if !vertex.is_active() {
            continue;
        }

        let (vertex_id, out_edges, value) = vertex.parts_mut();
        let mut rng = vertex_rng(seed, superstep, vertex_id);
        let incoming = mailboxes.inbox(position);
        let mut ctx = ComputeContext::new(
            superstep,
            vertex_id,
            out_edges,
            incoming,
            value,
            &mut outbox,
            &mut rng,
        );

        rule.compute(&mut ctx)
            .map_err(|source| SuperstepError::Update { superstep, source })?;
        let voted_to_halt = ctx.voted_to_halt();

        trace!(
            superstep,
            vertex = %vertex_id,
            incoming = incoming.len(),
            sent = outbox.len(),
            voted_to_halt,
            "Vertex computed"
        );

        vertex.finish_compute(voted_to_halt);
        summary.invoked = summary.invoked.saturating_add(1);
        if voted_to_halt {
            summary.halted = summary.halted.saturating_add(1);
        }

        for envelope in outbox.drain(..) {
            let destination = graph.index_of(envelope.destination).ok_or(
                SuperstepError::UnknownDestination {
                    superstep,
                    sender: vertex_id,
                    destination: envelope.destination,
                },
            )?;
            deliveries.push((destination, envelope.message));
        }
    }

    // --- Phase 2: Redistribute ---
    summary.messages_sent = deliveries.len();
    for (destination, message) in deliveries {
        let accepting = graph
            .vertices()
            .get(destination)
            .is_some_and(|vertex| vertex.is_active());
        if accepting && mailboxes.post(destination, message) {
            continue;
        }
        summary.messages_discarded = summary.messages_discarded.saturating_add(1);
    }

    // --- Phase 3: Barrier ---
    summary.messages_delivered = mailboxes.deliver();

    Ok(summary)
}
