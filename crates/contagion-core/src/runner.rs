//! Run driver: superstep loop, stats series, and termination.
//!
//! [`Engine::run`] wraps the single-round [`run_superstep`] and adds the
//! control plane around it:
//!
//! - **Natural termination**: stop as soon as no vertex is active
//! - **Step ceiling**: stop after `max_supersteps` rounds, force-halting
//!   every vertex that is still active
//! - **Stats series**: one collector row per completed superstep, in order
//! - **Abort**: any superstep error ends the run and poisons the engine
//!
//! [`run_superstep`]: crate::superstep::run_superstep

use std::time::Instant;

use chrono::{DateTime, Utc};
use contagion_types::RunId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SuperstepClock};
use crate::compute::UpdateRule;
use crate::graph::Graph;
use crate::mailbox::Mailboxes;
use crate::stats::StatsCollector;
use crate::superstep::{self, SuperstepError};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A superstep failed.
    #[error("superstep error: {source}")]
    Superstep {
        /// The underlying superstep error.
        #[from]
        source: SuperstepError,
    },

    /// The superstep counter could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A previous run on this engine failed part-way through a superstep.
    #[error("engine {run_id} was aborted by an earlier failure; rebuild it from initial state")]
    Aborted {
        /// The run that failed.
        run_id: RunId,
    },
}

/// Reason why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Every vertex voted to halt (or started inactive).
    AllHalted,
    /// The configured step ceiling was reached.
    StepCeiling,
}

/// Engine construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    /// Seed for every per-vertex random stream.
    pub seed: u64,
    /// Maximum number of supersteps to execute. `None` runs until every
    /// vertex halts.
    pub max_supersteps: Option<u64>,
}

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<Row> {
    /// Identifier of the engine that produced this report.
    pub run_id: RunId,
    /// One stats row per completed superstep, in superstep order.
    pub rows: Vec<Row>,
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// Number of supersteps executed by this call.
    pub supersteps: u64,
    /// Total number of messages delivered across all barriers.
    pub messages_delivered: u64,
    /// Vertices still active when the ceiling force-halted them.
    pub forced_halts: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}

/// A BSP engine over one graph.
///
/// The engine owns the vertex set, the mailboxes and the superstep clock.
/// The update rule and stats collector are supplied per call, so the same
/// engine type runs any simulation.
#[derive(Debug)]
pub struct Engine<V, P> {
    graph: Graph<V>,
    mailboxes: Mailboxes<P>,
    clock: SuperstepClock,
    seed: u64,
    run_id: RunId,
    poisoned: bool,
}

impl<V, P> Engine<V, P> {
    /// Create an engine at superstep 0 with empty mailboxes.
    pub fn new(graph: Graph<V>, options: EngineOptions) -> Self {
        let mailboxes = Mailboxes::new(graph.len());
        Self {
            graph,
            mailboxes,
            clock: SuperstepClock::new(options.max_supersteps),
            seed: options.seed,
            run_id: RunId::new(),
            poisoned: false,
        }
    }

    /// The vertex set in its current state.
    pub const fn graph(&self) -> &Graph<V> {
        &self.graph
    }

    /// Number of the next superstep to run.
    pub const fn superstep(&self) -> u64 {
        self.clock.superstep()
    }

    /// Identifier attached to every report and log line from this engine.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Consume the engine and return the final vertex set.
    pub fn into_graph(self) -> Graph<V> {
        self.graph
    }

    /// Run supersteps until every vertex has halted or the ceiling is hit.
    ///
    /// After each completed superstep the collector is invoked once and its
    /// row appended to the report. A superstep that fails contributes no
    /// row.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] if a superstep fails or the clock overflows.
    /// Once a superstep has failed, every later call returns
    /// [`RunError::Aborted`].
    pub fn run<R, S>(&mut self, rule: &R, collector: &S) -> Result<RunReport<S::Row>, RunError>
    where
        R: UpdateRule<Value = V, Payload = P> + ?Sized,
        S: StatsCollector<V> + ?Sized,
    {
        if self.poisoned {
            return Err(RunError::Aborted {
                run_id: self.run_id,
            });
        }

        let started_at = Utc::now();
        let timer = Instant::now();
        let mut rows = Vec::new();
        let mut supersteps: u64 = 0;
        let mut messages_delivered: u64 = 0;
        let mut forced_halts: usize = 0;

        info!(
            run_id = %self.run_id,
            vertices = self.graph.len(),
            edges = self.graph.edge_count(),
            active = self.graph.active_count(),
            superstep = self.clock.superstep(),
            max_supersteps = self.clock.ceiling(),
            remaining = self.clock.remaining(),
            "Run starting"
        );

        let end_reason = loop {
            // --- Check natural termination (before superstep) ---
            if self.graph.active_count() == 0 {
                break EndReason::AllHalted;
            }

            // --- Check step ceiling (before superstep) ---
            if self.clock.ceiling_reached() {
                forced_halts = self.force_halt_all();
                warn!(
                    run_id = %self.run_id,
                    superstep = self.clock.superstep(),
                    forced_halts,
                    "Step ceiling reached, halting active vertices"
                );
                break EndReason::StepCeiling;
            }

            // --- Execute superstep ---
            let superstep = self.clock.superstep();
            let summary = match superstep::run_superstep(
                &mut self.graph,
                &mut self.mailboxes,
                rule,
                superstep,
                self.seed,
            ) {
                Ok(summary) => summary,
                Err(err) => {
                    self.poisoned = true;
                    warn!(run_id = %self.run_id, superstep, error = %err, "Run aborted");
                    return Err(err.into());
                }
            };

            debug!(
                run_id = %self.run_id,
                superstep,
                invoked = summary.invoked,
                halted = summary.halted,
                sent = summary.messages_sent,
                delivered = summary.messages_delivered,
                discarded = summary.messages_discarded,
                "Superstep complete"
            );

            // --- Collect stats ---
            rows.push(collector.collect(superstep, &self.graph));

            // --- Advance ---
            messages_delivered = messages_delivered
                .saturating_add(u64::try_from(summary.messages_delivered).unwrap_or(u64::MAX));
            supersteps = supersteps.saturating_add(1);
            self.clock.advance()?;
        };

        let report = RunReport {
            run_id: self.run_id,
            rows,
            end_reason,
            supersteps,
            messages_delivered,
            forced_halts,
            started_at,
            elapsed_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        log_run_end(&report);
        Ok(report)
    }

    /// Halt every active vertex. Returns how many were still active.
    fn force_halt_all(&mut self) -> usize {
        self.graph
            .vertices_mut()
            .iter_mut()
            .map(|vertex| vertex.force_halt())
            .filter(|&was_active| was_active)
            .count()
    }
}

/// Build an engine over `graph` and run it to completion.
///
/// # Errors
///
/// Returns [`RunError`] if any superstep fails.
pub fn run<R, S>(
    graph: Graph<R::Value>,
    rule: &R,
    collector: &S,
    options: EngineOptions,
) -> Result<RunReport<S::Row>, RunError>
where
    R: UpdateRule + ?Sized,
    S: StatsCollector<R::Value> + ?Sized,
{
    Engine::new(graph, options).run(rule, collector)
}

/// Log the end of a run.
pub fn log_run_end<Row>(report: &RunReport<Row>) {
    info!(
        run_id = %report.run_id,
        reason = ?report.end_reason,
        supersteps = report.supersteps,
        rows = report.rows.len(),
        messages_delivered = report.messages_delivered,
        elapsed_ms = report.elapsed_ms,
        "Run ended"
    );

    if report.supersteps == 0 {
        warn!(run_id = %report.run_id, "Run ended with no supersteps executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use contagion_types::VertexId;

    use super::*;
    use crate::compute::{ComputeContext, UpdateError};
    use crate::stats::NoStats;
    use crate::vertex::VertexRecord;

    /// Counts down its value and halts at zero.
    struct Countdown;

    impl UpdateRule for Countdown {
        type Value = u32;
        type Payload = ();

        fn compute(&self, ctx: &mut ComputeContext<'_, u32, ()>) -> Result<(), UpdateError> {
            let next = ctx.value().saturating_sub(1);
            ctx.set_value(next);
            if next == 0 {
                ctx.vote_to_halt();
            }
            Ok(())
        }
    }

    fn countdown_graph(starts: &[u32]) -> Graph<u32> {
        Graph::from_records(starts.iter().zip(0_u64..).map(|(&start, id)| {
            VertexRecord::new(VertexId(id), start, Vec::new())
        }))
        .unwrap()
    }

    #[test]
    fn runs_until_all_halted() {
        let mut engine = Engine::new(countdown_graph(&[2, 4]), EngineOptions::default());
        let report = engine.run(&Countdown, &NoStats).unwrap();
        assert_eq!(report.end_reason, EndReason::AllHalted);
        assert_eq!(report.rows, vec![0, 1, 2, 3]);
        assert_eq!(report.supersteps, 4);
        assert_eq!(report.forced_halts, 0);
        assert_eq!(engine.superstep(), 4);
    }

    #[test]
    fn ceiling_force_halts_survivors() {
        let options = EngineOptions {
            seed: 0,
            max_supersteps: Some(2),
        };
        let mut engine = Engine::new(countdown_graph(&[1, 10, 10]), options);
        let report = engine.run(&Countdown, &NoStats).unwrap();
        assert_eq!(report.end_reason, EndReason::StepCeiling);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.forced_halts, 2);
        assert_eq!(engine.graph().active_count(), 0);
    }

    #[test]
    fn zero_ceiling_runs_nothing() {
        let options = EngineOptions {
            seed: 0,
            max_supersteps: Some(0),
        };
        let report = run(countdown_graph(&[3]), &Countdown, &NoStats, options).unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.end_reason, EndReason::StepCeiling);
        assert_eq!(report.forced_halts, 1);
    }

    #[test]
    fn end_reason_serializes_snake_case() {
        let json = serde_json::to_string(&EndReason::StepCeiling).unwrap();
        assert_eq!(json, "\"step_ceiling\"");
    }
}
