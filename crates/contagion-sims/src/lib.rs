//! Epidemic and platform-switching simulations for the Contagion BSP engine.
//!
//! This crate is client code for `contagion-core`: it supplies update
//! rules, stats collectors, random topologies and seeding. The engine never
//! learns which simulation it is running.
//!
//! # Modules
//!
//! - [`epidemic`] -- [`EpidemicRule`], [`EpidemicStats`], and the R0 helper.
//! - [`error`] -- Error type for simulation setup and runs ([`SimError`]).
//! - [`sampling`] -- Probability validation and seed-vertex selection.
//! - [`social`] -- [`PlatformRule`] and [`PlatformStats`].
//! - [`topology`] -- Erdos-Renyi and Watts-Strogatz generators.
//!
//! [`EpidemicRule`]: epidemic::EpidemicRule
//! [`EpidemicStats`]: epidemic::EpidemicStats
//! [`SimError`]: error::SimError
//! [`PlatformRule`]: social::PlatformRule
//! [`PlatformStats`]: social::PlatformStats

pub mod epidemic;
pub mod error;
pub mod sampling;
pub mod social;
pub mod topology;
