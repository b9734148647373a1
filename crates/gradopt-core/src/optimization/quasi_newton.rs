//! Adds the quasi-Newton direction capability to any objective.

use crate::{
    core::{
        error::Result,
        objective::{FirstOrderFunction, GradientNorms},
        types::{DVector, Scalar},
    },
    optimization::direction::{
        CurvatureRatioScaling, DirectionHistory, DirectionRequest, EigenvalueScaling,
        QuasiNewtonConfig, QuasiNewtonDirectionUpdater,
    },
};

/// Wraps a [`FirstOrderFunction`] and answers `next_direction` with the
/// L-BFGS two-loop recursion.
///
/// # Examples
///
/// ```
/// use gradopt_core::prelude::*;
///
/// let function = QuasiNewtonFunction::new(QuadraticFunction::<f64>::simple(2));
/// let mut problem = GradientProblem::new(function);
///
/// let x = DVector::from_vec(vec![1.0, 2.0]);
/// let mut gradient = DVector::zeros(2);
/// let cost = problem.evaluate(&x, Some(&mut gradient)).unwrap();
/// assert_eq!(cost, 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct QuasiNewtonFunction<F, T: Scalar, S = CurvatureRatioScaling> {
    inner: F,
    updater: QuasiNewtonDirectionUpdater<T, S>,
}

impl<F, T> QuasiNewtonFunction<F, T>
where
    F: FirstOrderFunction<T>,
    T: Scalar,
{
    /// Wraps `inner` with the default updater configuration.
    pub fn new(inner: F) -> Self {
        Self::with_updater(inner, QuasiNewtonDirectionUpdater::new(QuasiNewtonConfig::default()))
    }

    /// Wraps `inner` with the given configuration.
    pub fn with_config(inner: F, config: QuasiNewtonConfig<T>) -> Self {
        Self::with_updater(inner, QuasiNewtonDirectionUpdater::new(config))
    }
}

impl<F, T, S> QuasiNewtonFunction<F, T, S>
where
    F: FirstOrderFunction<T>,
    T: Scalar,
    S: EigenvalueScaling<T>,
{
    /// Wraps `inner` with a fully configured updater.
    pub fn with_updater(inner: F, updater: QuasiNewtonDirectionUpdater<T, S>) -> Self {
        Self { inner, updater }
    }

    /// The wrapped objective.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// The direction updater.
    pub fn updater(&self) -> &QuasiNewtonDirectionUpdater<T, S> {
        &self.updater
    }

    /// Unwraps the objective.
    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F, T, S> FirstOrderFunction<T> for QuasiNewtonFunction<F, T, S>
where
    F: FirstOrderFunction<T>,
    T: Scalar,
    S: EigenvalueScaling<T>,
{
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T> {
        self.inner.evaluate(parameters, gradient)
    }

    fn num_parameters(&self) -> usize {
        self.inner.num_parameters()
    }

    fn evaluate_gradient_norms(
        &self,
        x: &DVector<T>,
        gradient: &DVector<T>,
    ) -> Option<GradientNorms<T>> {
        self.inner.evaluate_gradient_norms(x, gradient)
    }

    fn next_direction(
        &self,
        request: &DirectionRequest<'_, T>,
        history: &mut dyn DirectionHistory<T>,
        approximate_eigenvalue_scale: &mut T,
        direction: &mut DVector<T>,
    ) -> Result<T> {
        self.updater
            .next_direction(request, history, approximate_eigenvalue_scale, direction)
    }
}
