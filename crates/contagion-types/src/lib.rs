//! Shared type definitions for the Contagion BSP engine.
//!
//! This crate holds the small vocabulary every other crate in the
//! workspace speaks: vertex and run identifiers, the vertex lifecycle,
//! in-flight message envelopes, and the platform labels used by the
//! social simulation.
//!
//! # Modules
//!
//! - [`ids`] -- `VertexId` and `RunId`
//! - [`enums`] -- `VertexStatus` lifecycle and `Platform` labels
//! - [`message`] -- `Message` and `Envelope`

pub mod enums;
pub mod ids;
pub mod message;

// Re-export all public types at crate root for convenience.
pub use enums::{Platform, VertexStatus};
pub use ids::{RunId, VertexId};
pub use message::{Envelope, Message};
