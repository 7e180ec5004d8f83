//! Enumeration types shared by the engine and the simulations.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vertex lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a vertex within a single run.
///
/// ```text
/// PendingInit --compute--> Running --vote to halt--> Halted
///      |                                               ^
///      +-------------vote to halt / inactive at build--+
/// ```
///
/// `Halted` is terminal: the engine never moves a vertex out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexStatus {
    /// Active, but the update rule has not been invoked yet.
    PendingInit,
    /// Active and invoked at least once.
    Running,
    /// Voted to halt (or was forced to at the step ceiling).
    Halted,
}

impl VertexStatus {
    /// Whether the vertex will be invoked in the next superstep.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Halted)
    }

    /// Status after a completed compute call.
    ///
    /// A halted vertex stays halted regardless of `voted_to_halt`.
    #[must_use]
    pub const fn after_compute(self, voted_to_halt: bool) -> Self {
        match self {
            Self::Halted => Self::Halted,
            Self::PendingInit | Self::Running => {
                if voted_to_halt {
                    Self::Halted
                } else {
                    Self::Running
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Social platforms
// ---------------------------------------------------------------------------

/// Platform label carried by a vertex in the platform-switching simulation.
///
/// The switch is one-way: a vertex on [`Platform::M`] never returns to
/// [`Platform::F`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// The incumbent platform every vertex starts on unless seeded.
    F,
    /// The challenger platform.
    M,
}

impl core::fmt::Display for Platform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::F => f.write_str("F"),
            Self::M => f.write_str("M"),
        }
    }
}
