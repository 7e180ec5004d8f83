//! Messages exchanged between vertices across a superstep boundary.

use serde::{Deserialize, Serialize};

use crate::ids::VertexId;

/// A message as seen by its recipient.
///
/// `weight` is an opaque annotation the update rule may interpret (edge
/// weight, signal strength); the engine never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message<P> {
    /// The vertex that emitted the message.
    pub source: VertexId,
    /// Opaque numeric annotation.
    pub weight: f64,
    /// Application-defined content.
    pub payload: P,
}

/// A message still in flight, tagged with its destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<P> {
    /// The vertex the message is addressed to.
    pub destination: VertexId,
    /// The message itself.
    pub message: Message<P>,
}

impl<P> Envelope<P> {
    /// Build an envelope from its parts.
    pub const fn new(source: VertexId, destination: VertexId, weight: f64, payload: P) -> Self {
        Self {
            destination,
            message: Message {
                source,
                weight,
                payload,
            },
        }
    }
}
