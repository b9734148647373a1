//! Evaluation telemetry.

pub mod execution_summary;

pub use execution_summary::{
    CallStatistics, EvaluationLabel, ExecutionSummary, ScopedExecutionTimer,
};
