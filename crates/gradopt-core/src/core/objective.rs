//! First-order objective interface.
//!
//! This module provides the trait user objectives implement to be
//! minimized from their value and gradient alone, together with a few
//! reusable objectives and wrappers.
//!
//! # Capabilities
//!
//! Every objective must evaluate its cost and, on request, its gradient.
//! Two further capabilities are optional and report
//! "unsupported" by default:
//! - gradient norms, for objectives that can compute them more cheaply or
//!   more accurately than from the gradient vector;
//! - a quasi-Newton search direction, computed from a history the caller
//!   owns (see [`crate::optimization::direction`]).
//!
//! Callers must always check for the unsupported signal rather than assume
//! a capability is present.

use crate::{
    core::{
        error::{ObjectiveError, Result},
        types::{DMatrix, DVector, Scalar},
    },
    optimization::direction::{DirectionHistory, DirectionRequest},
};
use num_traits::Float;
use std::cell::Cell;
use std::fmt::Debug;

/// Squared Euclidean norm and max-abs norm of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradientNorms<T> {
    /// Sum of squared gradient entries.
    pub squared_norm: T,
    /// Largest absolute gradient entry.
    pub max_norm: T,
}

/// Trait for objectives described only by their value and gradient.
///
/// The number of parameters is fixed for the lifetime of the object.
pub trait FirstOrderFunction<T: Scalar>: Debug {
    /// Evaluates the cost at `parameters`.
    ///
    /// The gradient is written only when `gradient` is `Some`; an
    /// implementation must not spend effort on it otherwise. A numerical
    /// breakdown (NaN, point outside the domain) is reported as
    /// [`ObjectiveError::EvaluationFailed`].
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T>;

    /// Returns the number of parameters.
    fn num_parameters(&self) -> usize;

    /// Computes gradient norms at `x`.
    ///
    /// Returns `None` when unsupported, in which case the caller derives
    /// the norms from the gradient vector itself.
    fn evaluate_gradient_norms(
        &self,
        _x: &DVector<T>,
        _gradient: &DVector<T>,
    ) -> Option<GradientNorms<T>> {
        None
    }

    /// Computes the next quasi-Newton search direction.
    ///
    /// On success writes the direction into `direction` and returns
    /// `direction · current_gradient`. The default returns
    /// [`ObjectiveError::NotSupported`] and the caller falls back to
    /// steepest descent.
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

impl<T: Scalar, F: FirstOrderFunction<T> + ?Sized> FirstOrderFunction<T> for Box<F> {
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T> {
        (**self).evaluate(parameters, gradient)
    }

    fn num_parameters(&self) -> usize {
        (**self).num_parameters()
    }

    fn evaluate_gradient_norms(
        &self,
        x: &DVector<T>,
        gradient: &DVector<T>,
    ) -> Option<GradientNorms<T>> {
        (**self).evaluate_gradient_norms(x, gradient)
    }

    fn next_direction(
        &self,
        request: &DirectionRequest<'_, T>,
        history: &mut dyn DirectionHistory<T>,
        approximate_eigenvalue_scale: &mut T,
        direction: &mut DVector<T>,
    ) -> Result<T> {
        (**self).next_direction(request, history, approximate_eigenvalue_scale, direction)
    }
}

/// A quadratic objective.
///
/// Computes f(x) = 0.5 * x^T * A * x + b^T * x + c
#[derive(Debug, Clone)]
pub struct QuadraticFunction<T: Scalar> {
    /// The quadratic form matrix (should be symmetric)
    pub a: DMatrix<T>,
    /// The linear term
    pub b: DVector<T>,
    /// The constant term
    pub c: T,
}

impl<T: Scalar> QuadraticFunction<T> {
    /// Creates a new quadratic objective.
    ///
    /// Returns a dimension error if `a` is not square or does not match `b`.
    pub fn new(a: DMatrix<T>, b: DVector<T>, c: T) -> Result<Self> {
        if a.nrows() != a.ncols() {
            return Err(ObjectiveError::dimension_mismatch(a.nrows(), a.ncols()));
        }
        if a.nrows() != b.len() {
            return Err(ObjectiveError::dimension_mismatch(a.nrows(), b.len()));
        }
        Ok(Self { a, b, c })
    }

    /// Creates f(x) = 0.5 * ||x||^2 in `n` dimensions.
    pub fn simple(n: usize) -> Self {
        Self {
            a: DMatrix::identity(n, n),
            b: DVector::zeros(n),
            c: T::zero(),
        }
    }
}

impl<T: Scalar> FirstOrderFunction<T> for QuadraticFunction<T> {
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T> {
        let ax = &self.a * parameters;
        let cost = parameters.dot(&ax) * <T as Scalar>::from_f64(0.5) + self.b.dot(parameters) + self.c;
        if let Some(gradient) = gradient {
            gradient.copy_from(&ax);
            *gradient += &self.b;
        }
        Ok(cost)
    }

    fn num_parameters(&self) -> usize {
        self.b.len()
    }
}

/// Wrapper to count evaluations for testing and debugging.
///
/// `cost_count` counts every call, `gradient_count` only the calls that
/// requested a gradient.
#[derive(Debug)]
pub struct CountingFunction<F> {
    /// The underlying objective
    pub inner: F,
    cost_count: Cell<usize>,
    gradient_count: Cell<usize>,
}

impl<F> CountingFunction<F> {
    /// Creates a new counting wrapper around an objective.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            cost_count: Cell::new(0),
            gradient_count: Cell::new(0),
        }
    }

    /// Resets all counters to zero.
    pub fn reset_counts(&self) {
        self.cost_count.set(0);
        self.gradient_count.set(0);
    }

    /// Returns the current (cost, gradient) evaluation counts.
    pub fn counts(&self) -> (usize, usize) {
        (self.cost_count.get(), self.gradient_count.get())
    }
}

impl<T, F> FirstOrderFunction<T> for CountingFunction<F>
where
    T: Scalar,
    F: FirstOrderFunction<T>,
{
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T> {
        self.cost_count.set(self.cost_count.get() + 1);
        if gradient.is_some() {
            self.gradient_count.set(self.gradient_count.get() + 1);
        }
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
        self.inner
            .next_direction(request, history, approximate_eigenvalue_scale, direction)
    }
}

/// Utilities for checking gradient implementations.
pub struct DerivativeChecker;

impl DerivativeChecker {
    /// Approximates the gradient by central differences on the cost.
    pub fn gradient_fd<T, F>(function: &F, point: &DVector<T>) -> Result<DVector<T>>
    where
        T: Scalar,
        F: FirstOrderFunction<T> + ?Sized,
    {
        let n = point.len();
        let h = <T as Float>::sqrt(T::EPSILON);
        let mut gradient = DVector::zeros(n);
        let mut probe = point.clone();

        for i in 0..n {
            let xi = point[i];
            let step = h * <T as Float>::max(T::one(), <T as Float>::abs(xi));

            probe[i] = xi + step;
            let f_plus = function.evaluate(&probe, None)?;
            probe[i] = xi - step;
            let f_minus = function.evaluate(&probe, None)?;
            probe[i] = xi;

            gradient[i] = (f_plus - f_minus) / (step + step);
        }

        Ok(gradient)
    }

    /// Checks if the analytical gradient matches finite differences.
    ///
    /// Returns (passes, max_error) where max_error is the largest
    /// component-wise deviation.
    pub fn check_gradient<T, F>(function: &F, point: &DVector<T>, tol: T) -> Result<(bool, T)>
    where
        T: Scalar,
        F: FirstOrderFunction<T> + ?Sized,
    {
        let mut analytical = DVector::zeros(point.len());
        function.evaluate(point, Some(&mut analytical))?;
        let fd = Self::gradient_fd(function, point)?;

        let max_error = crate::core::types::max_abs(&(analytical - fd));
        Ok((max_error < tol, max_error))
    }
}
