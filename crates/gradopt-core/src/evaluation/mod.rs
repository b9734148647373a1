//! Evaluators connecting problems to minimizers.

pub mod evaluator;
pub mod gradient_problem_evaluator;

pub use evaluator::{projected_gradient_norms, EvaluateOptions, Evaluator, LineSearchState};
pub use gradient_problem_evaluator::GradientProblemEvaluator;
