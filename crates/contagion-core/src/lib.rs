//! Superstep clock, coordinator, and run driver for the Contagion BSP engine.
//!
//! This crate owns the synchronous round loop that drives every
//! simulation: Compute, Redistribute, Barrier, Collect, Advance. It knows
//! nothing about epidemics or platforms; simulations plug in through
//! [`UpdateRule`] and [`StatsCollector`].
//!
//! # Modules
//!
//! - [`clock`] -- Superstep counter with an optional step ceiling.
//! - [`compute`] -- [`UpdateRule`] trait and the per-vertex [`ComputeContext`].
//! - [`config`] -- Configuration loading from `contagion-config.yaml` into
//!   strongly-typed structs.
//! - [`graph`] -- Validated vertex set built from [`VertexRecord`]s.
//! - [`mailbox`] -- Double-buffered per-vertex inboxes.
//! - [`rng`] -- Per-vertex, per-superstep random streams.
//! - [`runner`] -- [`Engine`] and the run loop.
//! - [`stats`] -- [`StatsCollector`] trait.
//! - [`superstep`] -- One synchronous round.
//! - [`vertex`] -- Vertex records and lifecycle.
//!
//! [`UpdateRule`]: compute::UpdateRule
//! [`ComputeContext`]: compute::ComputeContext
//! [`StatsCollector`]: stats::StatsCollector
//! [`VertexRecord`]: vertex::VertexRecord
//! [`Engine`]: runner::Engine

pub mod clock;
pub mod compute;
pub mod config;
pub mod graph;
pub mod mailbox;
pub mod rng;
pub mod runner;
pub mod stats;
pub mod superstep;
pub mod vertex;
