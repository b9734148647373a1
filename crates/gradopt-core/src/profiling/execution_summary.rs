//! Call-time accounting for evaluators.
//!
//! Every evaluator records its calls under a closed set of labels so that
//! statistics collected while a line-search minimizer drives evaluation can
//! be compared with those of a trust-region minimizer.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::trace;

/// Accounting key of an evaluator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationLabel {
    /// Every call, whatever was requested.
    Total,
    /// Calls that requested the cost only.
    Residual,
    /// Calls that requested derivatives as well.
    Jacobian,
}

impl EvaluationLabel {
    /// All labels, in reporting order.
    pub const ALL: [EvaluationLabel; 3] = [Self::Total, Self::Residual, Self::Jacobian];

    /// Stable name shared by every minimizer family.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Total => "Evaluator::Total",
            Self::Residual => "Evaluator::Residual",
            Self::Jacobian => "Evaluator::Jacobian",
        }
    }

    /// Label of a call, depending on whether derivatives were requested.
    pub const fn for_call(derivatives_requested: bool) -> Self {
        if derivatives_requested {
            Self::Jacobian
        } else {
            Self::Residual
        }
    }
}

impl fmt::Display for EvaluationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of calls and accumulated wall-clock time under one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallStatistics {
    /// Number of recorded calls.
    pub calls: usize,
    /// Total elapsed time of the recorded calls.
    pub time: Duration,
}

/// Thread-safe accumulator of [`CallStatistics`] per label.
#[derive(Debug, Default)]
pub struct ExecutionSummary {
    statistics: Mutex<BTreeMap<EvaluationLabel, CallStatistics>>,
}

impl ExecutionSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one call of duration `elapsed` under `label`.
    pub fn record(&self, label: EvaluationLabel, elapsed: Duration) {
        let mut statistics = self.statistics.lock();
        let entry = statistics.entry(label).or_default();
        entry.calls += 1;
        entry.time += elapsed;
    }

    /// Statistics for one label; zero if nothing was recorded.
    pub fn get(&self, label: EvaluationLabel) -> CallStatistics {
        self.statistics
            .lock()
            .get(&label)
            .copied()
            .unwrap_or_default()
    }

    /// Snapshot of all recorded statistics.
    pub fn statistics(&self) -> BTreeMap<EvaluationLabel, CallStatistics> {
        self.statistics.lock().clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.statistics.lock().clear();
    }
}

/// Records the lifetime of the guard into an [`ExecutionSummary`] on drop.
///
/// Nested timers report `Total ≥` the sum of their inner timers as long as
/// the outer one is created first.
#[must_use = "the call is timed until the guard is dropped"]
pub struct ScopedExecutionTimer<'a> {
    summary: &'a ExecutionSummary,
    label: EvaluationLabel,
    start: Instant,
}

impl<'a> ScopedExecutionTimer<'a> {
    /// Starts timing a call under `label`.
    pub fn new(summary: &'a ExecutionSummary, label: EvaluationLabel) -> Self {
        Self {
            summary,
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedExecutionTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        trace!(label = self.label.as_str(), ?elapsed, "evaluator call");
        self.summary.record(self.label, elapsed);
    }
}
