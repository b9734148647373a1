//! The evaluation capability shared by every minimizer family.
//!
//! Line-search and trust-region minimizers both drive an [`Evaluator`]:
//! least-squares evaluators produce residuals and a Jacobian, gradient
//! evaluators produce a cost and a gradient. Keeping one interface lets
//! call statistics be compared regardless of which minimizer is running.

use crate::{
    core::{
        error::{check_len, ObjectiveError, Result},
        objective::GradientNorms,
        types::{max_abs, DMatrix, DVector, Scalar},
    },
    optimization::direction::{DirectionHistory, DirectionRequest},
    profiling::execution_summary::{CallStatistics, EvaluationLabel},
};
use std::collections::BTreeMap;

/// Per-call evaluation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluateOptions {
    /// Apply a robust loss to the residuals, when the evaluator has one.
    pub apply_loss_function: bool,
    /// The point differs from the one of the previous call.
    pub new_evaluation_point: bool,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            apply_loss_function: true,
            new_evaluation_point: true,
        }
    }
}

impl EvaluateOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the robust loss is applied.
    pub fn with_apply_loss_function(mut self, apply: bool) -> Self {
        self.apply_loss_function = apply;
        self
    }

    /// Sets whether the point is new.
    pub fn with_new_evaluation_point(mut self, new_point: bool) -> Self {
        self.new_evaluation_point = new_point;
        self
    }
}

/// Per-iteration state a line-search minimizer keeps about its iterate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSearchState<T: Scalar> {
    /// Cost at the iterate.
    pub cost: T,
    /// Tangent-space gradient at the iterate.
    pub gradient: DVector<T>,
    /// Squared norm of the projected gradient.
    pub gradient_squared_norm: T,
    /// Max-abs norm of the projected gradient.
    pub gradient_max_norm: T,
    /// Search direction leaving the iterate.
    pub search_direction: DVector<T>,
    /// `search_direction · gradient`.
    pub directional_derivative: T,
    /// Step length taken along `search_direction`.
    pub step_size: T,
}

impl<T: Scalar> LineSearchState<T> {
    /// Creates a zeroed state for `num_effective_parameters` tangent entries.
    pub fn new(num_effective_parameters: usize) -> Self {
        Self {
            cost: T::zero(),
            gradient: DVector::zeros(num_effective_parameters),
            gradient_squared_norm: T::zero(),
            gradient_max_norm: T::zero(),
            search_direction: DVector::zeros(num_effective_parameters),
            directional_derivative: T::zero(),
            step_size: T::zero(),
        }
    }

    /// The stored gradient norms.
    pub fn gradient_norms(&self) -> GradientNorms<T> {
        GradientNorms {
            squared_norm: self.gradient_squared_norm,
            max_norm: self.gradient_max_norm,
        }
    }

    /// Stores gradient norms.
    pub fn set_gradient_norms(&mut self, norms: GradientNorms<T>) {
        self.gradient_squared_norm = norms.squared_norm;
        self.gradient_max_norm = norms.max_norm;
    }
}

/// Trait for objects a minimizer evaluates its problem through.
pub trait Evaluator<T: Scalar> {
    /// Allocates a Jacobian of the right shape, or `None` if this evaluator
    /// never produces one.
    fn create_jacobian(&self) -> Option<DMatrix<T>>;

    /// Evaluates the cost at `state`, and optionally the residuals, the
    /// gradient and the Jacobian.
    fn evaluate(
        &mut self,
        options: &EvaluateOptions,
        state: &DVector<T>,
        residuals: Option<&mut DVector<T>>,
        gradient: Option<&mut DVector<T>>,
        jacobian: Option<&mut DMatrix<T>>,
    ) -> Result<T>;

    /// Computes `state_plus_delta = Plus(state, delta)`.
    fn plus(
        &self,
        state: &DVector<T>,
        delta: &DVector<T>,
        state_plus_delta: &mut DVector<T>,
    ) -> Result<()>;

    /// Size of the ambient point.
    fn num_parameters(&self) -> usize;

    /// Size of the tangent space steps are taken in.
    fn num_effective_parameters(&self) -> usize;

    /// Number of residuals.
    fn num_residuals(&self) -> usize;

    /// Accumulated call statistics.
    fn statistics(&self) -> BTreeMap<EvaluationLabel, CallStatistics> {
        BTreeMap::new()
    }

    /// Fills the gradient norms of `state` for the iterate `x`.
    ///
    /// The default uses the projected gradient, see
    /// [`projected_gradient_norms`].
    fn evaluate_gradient_norms(
        &self,
        x: &DVector<T>,
        state: &mut LineSearchState<T>,
    ) -> Result<()> {
        let norms = projected_gradient_norms(self, x, &state.gradient)?;
        state.set_gradient_norms(norms);
        Ok(())
    }

    /// Computes a quasi-Newton search direction. Unsupported by default.
    fn next_direction(
        &self,
        _request: &DirectionRequest<'_, T>,
        _history: &mut dyn DirectionHistory<T>,
        _approximate_eigenvalue_scale: &mut T,
        _direction: &mut DVector<T>,
    ) -> Result<T> {
        Err(ObjectiveError::not_supported("next_direction"))
    }
}

/// Norms of the projected gradient `x - Plus(x, -gradient)`.
///
/// Over Euclidean space this is the gradient itself. On a manifold it
/// measures the gradient in ambient coordinates, which is what convergence
/// tests compare against.
pub fn projected_gradient_norms<T, E>(
    evaluator: &E,
    x: &DVector<T>,
    gradient: &DVector<T>,
) -> Result<GradientNorms<T>>
where
    T: Scalar,
    E: Evaluator<T> + ?Sized,
{
    check_len(evaluator.num_parameters(), x.len())?;
    check_len(evaluator.num_effective_parameters(), gradient.len())?;

    let mut projected = DVector::zeros(x.len());
    evaluator.plus(x, &-gradient, &mut projected)?;
    let projected = x - projected;

    Ok(GradientNorms {
        squared_norm: projected.norm_squared(),
        max_norm: max_abs(&projected),
    })
}
