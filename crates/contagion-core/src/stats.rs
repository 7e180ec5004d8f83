//! Per-superstep statistics collection.
//!
//! A [`StatsCollector`] reduces the whole vertex set to one row after every
//! completed superstep. It runs after message redistribution and before the
//! clock advances, and only ever sees the graph through a shared reference.

use crate::graph::Graph;

/// Reduces the vertex set to one aggregate row per superstep.
///
/// Closures `Fn(u64, &Graph<V>) -> Row` implement this trait, so a collector
/// can be written inline.
pub trait StatsCollector<V> {
    /// The aggregate produced each superstep.
    type Row;

    /// Summarize the graph as it stands after `superstep` completed.
    fn collect(&self, superstep: u64, graph: &Graph<V>) -> Self::Row;
}

impl<V, R, F> StatsCollector<V> for F
where
    F: Fn(u64, &Graph<V>) -> R,
{
    type Row = R;

    fn collect(&self, superstep: u64, graph: &Graph<V>) -> R {
        self(superstep, graph)
    }
}

/// A collector that records only the superstep number.
///
/// Use it when a run needs no statistics; the rows still show how many
/// supersteps completed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStats;

impl<V> StatsCollector<V> for NoStats {
    type Row = u64;

    fn collect(&self, superstep: u64, _graph: &Graph<V>) -> u64 {
        superstep
    }
}

/// Fraction of `count` in `total`, or 0.0 for an empty population.
#[allow(clippy::cast_precision_loss)]
pub fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
