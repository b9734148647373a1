//! Evaluator for gradient problems.

use crate::{
    core::{
        error::{check_len, Result},
        gradient_problem::GradientProblem,
        types::{DMatrix, DVector, Scalar},
    },
    evaluation::evaluator::{projected_gradient_norms, EvaluateOptions, Evaluator, LineSearchState},
    optimization::direction::{DirectionHistory, DirectionRequest},
    profiling::execution_summary::{
        CallStatistics, EvaluationLabel, ExecutionSummary, ScopedExecutionTimer,
    },
};
use std::collections::BTreeMap;
use tracing::debug;

/// Drives a [`GradientProblem`] through the [`Evaluator`] interface.
///
/// The scalar objective counts as a single residual. This evaluator never
/// produces a Jacobian; asking it for one is a wiring error and panics.
///
/// Every call is timed twice: once under [`EvaluationLabel::Total`] and
/// once under [`EvaluationLabel::Residual`] or [`EvaluationLabel::Jacobian`]
/// depending on whether a gradient was requested.
#[derive(Debug)]
pub struct GradientProblemEvaluator<'a, T: Scalar> {
    problem: &'a mut GradientProblem<T>,
    execution_summary: ExecutionSummary,
}

impl<'a, T: Scalar> GradientProblemEvaluator<'a, T> {
    /// Borrows `problem` for the lifetime of the evaluator.
    pub fn new(problem: &'a mut GradientProblem<T>) -> Self {
        Self {
            problem,
            execution_summary: ExecutionSummary::new(),
        }
    }

    /// The evaluated problem.
    pub fn problem(&self) -> &GradientProblem<T> {
        self.problem
    }

    /// The raw call-time accumulator.
    pub fn execution_summary(&self) -> &ExecutionSummary {
        &self.execution_summary
    }
}

impl<T: Scalar> Evaluator<T> for GradientProblemEvaluator<'_, T> {
    fn create_jacobian(&self) -> Option<DMatrix<T>> {
        None
    }

    fn evaluate(
        &mut self,
        _options: &EvaluateOptions,
        state: &DVector<T>,
        residuals: Option<&mut DVector<T>>,
        gradient: Option<&mut DVector<T>>,
        jacobian: Option<&mut DMatrix<T>>,
    ) -> Result<T> {
        assert!(
            jacobian.is_none(),
            "GradientProblemEvaluator cannot evaluate a Jacobian"
        );

        let _total = ScopedExecutionTimer::new(&self.execution_summary, EvaluationLabel::Total);
        let _call = ScopedExecutionTimer::new(
            &self.execution_summary,
            EvaluationLabel::for_call(gradient.is_some()),
        );

        if let Some(residuals) = residuals.as_deref() {
            check_len(1, residuals.len())?;
        }

        let cost = self.problem.evaluate(state, gradient).map_err(|err| {
            debug!(error = %err, "gradient problem evaluation failed");
            err
        })?;

        if let Some(residuals) = residuals {
            residuals[0] = cost;
        }
        Ok(cost)
    }

    fn plus(
        &self,
        state: &DVector<T>,
        delta: &DVector<T>,
        state_plus_delta: &mut DVector<T>,
    ) -> Result<()> {
        self.problem.plus(state, delta, state_plus_delta)
    }

    fn num_parameters(&self) -> usize {
        self.problem.num_parameters()
    }

    fn num_effective_parameters(&self) -> usize {
        self.problem.num_local_parameters()
    }

    fn num_residuals(&self) -> usize {
        1
    }

    fn statistics(&self) -> BTreeMap<EvaluationLabel, CallStatistics> {
        self.execution_summary.statistics()
    }

    fn evaluate_gradient_norms(
        &self,
        x: &DVector<T>,
        state: &mut LineSearchState<T>,
    ) -> Result<()> {
        let norms = match self.problem.evaluate_gradient_norms(x, &state.gradient) {
            Some(norms) => norms,
            None => projected_gradient_norms(self, x, &state.gradient)?,
        };
        state.set_gradient_norms(norms);
        Ok(())
    }

    fn next_direction(
        &self,
        request: &DirectionRequest<'_, T>,
        history: &mut dyn DirectionHistory<T>,
        approximate_eigenvalue_scale: &mut T,
        direction: &mut DVector<T>,
    ) -> Result<T> {
        self.problem
            .next_direction(request, history, approximate_eigenvalue_scale, direction)
    }
}
