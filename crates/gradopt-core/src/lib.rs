//! Core traits and types for gradient-based optimization.
//!
//! This crate provides what a line-search minimizer needs to drive an
//! objective known only through its value and gradient, optionally over a
//! non-Euclidean parameter space, and to build limited-memory quasi-Newton
//! search directions from a history it owns.
//!
//! # Key Concepts
//!
//! - **First-order functions**: objectives evaluating a cost and, on
//!   request, a gradient
//! - **Retractions**: maps from tangent-space updates back to ambient points
//! - **Gradient problems**: a function together with its parameter space
//! - **Evaluators**: the interface minimizers evaluate through, with
//!   call-time accounting
//! - **Direction updates**: the L-BFGS two-loop recursion over a borrowed
//!   history of step and gradient differences
//!
//! # Modules
//!
//! - [`core`]: objectives, gradient problems, errors and scalar types
//! - [`manifold_ops`]: the retraction interface
//! - [`evaluation`]: the evaluator interface and the gradient-problem evaluator
//! - [`profiling`]: evaluation telemetry
//! - [`optimization`]: quasi-Newton directions and history storage

pub mod core;
pub mod evaluation;
pub mod manifold_ops;
pub mod optimization;
pub mod profiling;
pub mod utils;

// Re-export commonly used items at the crate root
pub use crate::core::error::{ManifoldError, ManifoldResult, ObjectiveError, Result};
pub use crate::core::gradient_problem::GradientProblem;
pub use crate::core::objective::{FirstOrderFunction, GradientNorms};
pub use crate::core::types::Scalar;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use gradopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::error::{ManifoldError, ManifoldResult, ObjectiveError, Result};
    pub use crate::core::gradient_problem::GradientProblem;
    pub use crate::core::objective::{
        CountingFunction, DerivativeChecker, FirstOrderFunction, GradientNorms, QuadraticFunction,
    };
    pub use crate::core::types::{DMatrix, DVector, Scalar};
    pub use crate::evaluation::{
        projected_gradient_norms, EvaluateOptions, Evaluator, GradientProblemEvaluator,
        LineSearchState,
    };
    pub use crate::manifold_ops::retraction::{
        EuclideanRetraction, Retraction, RetractionVerifier,
    };
    pub use crate::optimization::{
        steepest_descent, CurvatureRatioScaling, DirectionHistory, DirectionRequest,
        DirectionUpdateContext, EigenvalueScaling, LimitedMemoryHistory, QuasiNewtonConfig,
        QuasiNewtonDirectionUpdater, QuasiNewtonFunction, RightMultiplyContext,
    };
    pub use crate::profiling::{
        CallStatistics, EvaluationLabel, ExecutionSummary, ScopedExecutionTimer,
    };
}
