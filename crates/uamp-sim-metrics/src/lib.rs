//! Metrics infrastructure for uamp-sim.
//!
//! Provides a structured [`Metric`] declaration type so metric names,
//! units, and descriptions live in one place instead of being spelled
//! out at every call site, and re-exports the `metrics` crate for
//! convenience.
//!
//! # Example
//!
//! ```rust
//! use uamp_sim_metrics::{Metric, MetricKind};
//! use metrics::Unit;
//!
//! const EVENTS_DISPATCHED: Metric = Metric::counter("uamp_sim.engine.events_dispatched")
//!     .with_description("Total events broadcast to subscribed modules")
//!     .with_unit(Unit::Count);
//!
//! assert_eq!(EVENTS_DISPATCHED.kind, MetricKind::Counter);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata, constructible at compile
/// time so metric names and labels can't drift from their callers.
#[derive(Debug, Clone)]
pub struct Metric {
    pub name: &'static str,
    pub kind: MetricKind,
    pub description: &'static str,
    pub unit: Option<Unit>,
    pub labels: &'static [&'static str],
}

impl Metric {
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    /// Call once at startup for each metric in [`metric_defs`].
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => describe_counter!(self.name, unit, self.description),
            (MetricKind::Counter, None) => describe_counter!(self.name, self.description),
            (MetricKind::Gauge, Some(unit)) => describe_gauge!(self.name, unit, self.description),
            (MetricKind::Gauge, None) => describe_gauge!(self.name, self.description),
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description)
            }
            (MetricKind::Histogram, None) => describe_histogram!(self.name, self.description),
        }
    }
}

/// All metric definitions used by the engine and its modules.
pub mod metric_defs {
    use super::Metric;
    use metrics::Unit;

    /// Total trace and alarm events dispatched to subscribed modules.
    pub const EVENTS_DISPATCHED: Metric = Metric::counter("uamp_sim.engine.events_dispatched")
        .with_description("Total events broadcast to subscribed modules")
        .with_unit(Unit::Count)
        .with_labels(&["event_type"]);

    /// Total alarm firings, both built-in and module-registered.
    pub const ALARMS_FIRED: Metric = Metric::counter("uamp_sim.engine.alarms_fired")
        .with_description("Total alarm callbacks invoked")
        .with_unit(Unit::Count);

    /// Number of entries currently buffered in the run queue.
    pub const QUEUE_DEPTH: Metric = Metric::gauge("uamp_sim.engine.queue_depth")
        .with_description("Entries currently buffered in the scheduler's priority queue")
        .with_unit(Unit::Count);

    /// Total preload predictions issued by the preload predictor module.
    pub const PRELOAD_PREDICTIONS: Metric = Metric::counter("uamp_sim.preload.predictions_issued")
        .with_description("Total preload predictions issued")
        .with_unit(Unit::Count);

    /// Total preload predictions later confirmed correct.
    pub const PRELOAD_CORRECT: Metric = Metric::counter("uamp_sim.preload.predictions_correct")
        .with_description("Total preload predictions confirmed correct within the verification window")
        .with_unit(Unit::Count);

    /// Total frequency-table decay ticks applied by the preload predictor.
    pub const PRELOAD_DECAY_TICKS: Metric = Metric::counter("uamp_sim.preload.decay_ticks")
        .with_description("Total frequency-table depreciation alarms fired")
        .with_unit(Unit::Count);

    /// All metric definitions, for bulk registration at startup.
    pub const ALL: &[Metric] = &[
        EVENTS_DISPATCHED,
        ALARMS_FIRED,
        QUEUE_DEPTH,
        PRELOAD_PREDICTIONS,
        PRELOAD_CORRECT,
        PRELOAD_DECAY_TICKS,
    ];
}

/// Register every metric's description with the active recorder.
/// Call once at process startup, before the first metric is recorded.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_kind_display() {
        assert_eq!(MetricKind::Counter.to_string(), "counter");
        assert_eq!(MetricKind::Histogram.as_str(), "histogram");
    }

    #[test]
    fn metric_defs_are_unique() {
        let mut names: Vec<&str> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort_unstable();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
    }
}
