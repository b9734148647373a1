//! Limited-memory quasi-Newton search directions.
//!
//! The updater in this module turns the current gradient and a history of
//! past steps into a descent direction with the L-BFGS two-loop recursion.
//! It never owns the history: the minimizer owns it and lends access for
//! the duration of one call through the [`DirectionHistory`] cursor trait.
//!
//! # Two-Loop Recursion
//!
//! ```text
//! q = g
//! for i = newest .. oldest:            (pairs with s_i·y_i > ε only)
//!     α_i = ρ_i <s_i, q>               ρ_i = 1 / <s_i, y_i>
//!     q = q - α_i y_i
//! r = γ q                              γ = 1, or the eigenvalue scale
//! for i = oldest .. newest:
//!     β = ρ_i <y_i, r>
//!     r = r + (α_i - β) s_i
//! d = -r
//! ```
//!
//! # References
//!
//! - Nocedal & Wright, "Numerical Optimization" (2006), Algorithm 7.4

use crate::core::{
    error::{check_len, ObjectiveError, Result},
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Write locations for the newest history pair.
///
/// Handed out by [`DirectionHistory::next_update_context`]; borrows the
/// history only until it is dropped.
#[derive(Debug)]
pub struct DirectionUpdateContext<'a, T: Scalar> {
    /// Slot for `s = step_size * previous_direction`.
    pub delta_x: &'a mut DVector<T>,
    /// Slot for `y = current_gradient - previous_gradient`.
    pub delta_gradient: &'a mut DVector<T>,
    /// Slot for `s·y`.
    pub delta_x_dot_delta_gradient: &'a mut T,
    /// Slot for the eigenvalue scale estimated from this pair.
    pub approximate_eigenvalue_scale: &'a mut T,
}

/// Read access to one stored history pair.
#[derive(Debug, Clone, Copy)]
pub struct RightMultiplyContext<'a, T: Scalar> {
    /// Stored `s_i`.
    pub delta_x: &'a DVector<T>,
    /// Stored `y_i`.
    pub delta_gradient: &'a DVector<T>,
    /// Stored `s_i·y_i`.
    pub delta_x_dot_delta_gradient: T,
}

/// Cursor interface over a history of `(s, y)` pairs owned by the caller.
pub trait DirectionHistory<T: Scalar> {
    /// Length of the stored `s` and `y` vectors.
    fn num_parameters(&self) -> usize;

    /// Returns the slot this iteration's pair should be written to, or
    /// `None` when the step must not be recorded (for example a rejected
    /// step). When the history is full the oldest pair is overwritten.
    fn next_update_context(&mut self, step_size: T) -> Option<DirectionUpdateContext<'_, T>>;

    /// Yields the stored pairs, newest first.
    fn right_multiply_contexts(&self) -> Box<dyn Iterator<Item = RightMultiplyContext<'_, T>> + '_>;
}

/// Inputs of one direction update.
#[derive(Debug, Clone, Copy)]
pub struct DirectionRequest<'a, T: Scalar> {
    /// Search direction of the previous iteration.
    pub previous_direction: &'a DVector<T>,
    /// Step length accepted along `previous_direction`.
    pub previous_step_size: T,
    /// Gradient at the current point.
    pub current_gradient: &'a DVector<T>,
    /// Gradient at the previous point.
    pub previous_gradient: &'a DVector<T>,
    /// Scale the initial inverse Hessian by the approximate eigenvalue.
    pub use_approximate_eigenvalue_scaling: bool,
}

/// Policy estimating the scale of the initial inverse Hessian from the
/// newest history pair.
pub trait EigenvalueScaling<T: Scalar>: Debug {
    /// Returns the estimate, or `None` if the pair gives none.
    fn estimate(
        &self,
        delta_x: &DVector<T>,
        delta_gradient: &DVector<T>,
        delta_x_dot_delta_gradient: T,
    ) -> Option<T>;
}

/// γ = (s·y) / (y·y).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurvatureRatioScaling;

impl<T: Scalar> EigenvalueScaling<T> for CurvatureRatioScaling {
    fn estimate(
        &self,
        _delta_x: &DVector<T>,
        delta_gradient: &DVector<T>,
        delta_x_dot_delta_gradient: T,
    ) -> Option<T> {
        let y_dot_y = delta_gradient.norm_squared();
        if y_dot_y > T::zero() {
            Some(delta_x_dot_delta_gradient / y_dot_y)
        } else {
            None
        }
    }
}

/// Configuration for the quasi-Newton direction update.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuasiNewtonConfig<T> {
    /// Pairs with `s·y` at or below this value are neither recorded nor used.
    pub curvature_threshold: T,
    /// Fail when the result is not a descent direction.
    pub require_descent: bool,
}

impl<T: Scalar> Default for QuasiNewtonConfig<T> {
    fn default() -> Self {
        Self {
            curvature_threshold: T::SECANT_TOLERANCE,
            require_descent: true,
        }
    }
}

impl<T: Scalar> QuasiNewtonConfig<T> {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the curvature threshold ε.
    pub fn with_curvature_threshold(mut self, threshold: T) -> Self {
        self.curvature_threshold = threshold;
        self
    }

    /// Enables or disables the descent check.
    pub fn with_require_descent(mut self, require: bool) -> Self {
        self.require_descent = require;
        self
    }
}

/// Writes the steepest-descent direction `-gradient` and returns
/// `-||gradient||²`.
pub fn steepest_descent<T: Scalar>(gradient: &DVector<T>, direction: &mut DVector<T>) -> T {
    direction.copy_from(gradient);
    direction.neg_mut();
    -gradient.norm_squared()
}

/// L-BFGS search direction from a caller-owned history.
#[derive(Debug, Clone)]
pub struct QuasiNewtonDirectionUpdater<T: Scalar, S = CurvatureRatioScaling> {
    config: QuasiNewtonConfig<T>,
    scaling: S,
    _phantom: PhantomData<T>,
}

impl<T: Scalar> Default for QuasiNewtonDirectionUpdater<T> {
    fn default() -> Self {
        Self::new(QuasiNewtonConfig::default())
    }
}

impl<T: Scalar> QuasiNewtonDirectionUpdater<T> {
    /// Creates an updater using the curvature-ratio eigenvalue estimate.
    pub fn new(config: QuasiNewtonConfig<T>) -> Self {
        Self::with_scaling(config, CurvatureRatioScaling)
    }
}

impl<T, S> QuasiNewtonDirectionUpdater<T, S>
where
    T: Scalar,
    S: EigenvalueScaling<T>,
{
    /// Creates an updater with a custom eigenvalue-scaling policy.
    pub fn with_scaling(config: QuasiNewtonConfig<T>, scaling: S) -> Self {
        Self {
            config,
            scaling,
            _phantom: PhantomData,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &QuasiNewtonConfig<T> {
        &self.config
    }

    /// Returns the eigenvalue-scaling policy.
    pub fn scaling(&self) -> &S {
        &self.scaling
    }

    /// Records the newest pair into `history` and computes the next
    /// search direction.
    ///
    /// `approximate_eigenvalue_scale` is updated whenever a new pair is
    /// recorded and read when the request asks for eigenvalue scaling.
    /// Returns `direction · current_gradient`.
    pub fn next_direction(
        &self,
        request: &DirectionRequest<'_, T>,
        history: &mut dyn DirectionHistory<T>,
        approximate_eigenvalue_scale: &mut T,
        direction: &mut DVector<T>,
    ) -> Result<T> {
        let gradient = request.current_gradient;
        let n = gradient.len();
        check_len(n, request.previous_direction.len())?;
        check_len(n, request.previous_gradient.len())?;
        check_len(n, direction.len())?;
        check_len(n, history.num_parameters())?;

        self.record(request, history, approximate_eigenvalue_scale)?;

        let scale = request
            .use_approximate_eigenvalue_scaling
            .then_some(*approximate_eigenvalue_scale);
        self.right_multiply(gradient, &*history, scale, direction);

        let directional_derivative = direction.dot(gradient);
        if !Float::is_finite(directional_derivative) {
            return Err(ObjectiveError::direction_update_failed(
                "non-finite directional derivative",
            ));
        }
        if self.config.require_descent
            && directional_derivative >= T::zero()
            && gradient.norm_squared() > T::zero()
        {
            return Err(ObjectiveError::direction_update_failed(format!(
                "not a descent direction (directional derivative {directional_derivative})"
            )));
        }

        Ok(directional_derivative)
    }

    /// Computes `direction = -H g` with the two-loop recursion over the
    /// usable pairs of `history`.
    ///
    /// With no usable pair the result is `-gradient`. `initial_scale`, when
    /// finite and positive, scales the initial inverse Hessian.
    pub fn right_multiply(
        &self,
        gradient: &DVector<T>,
        history: &dyn DirectionHistory<T>,
        initial_scale: Option<T>,
        direction: &mut DVector<T>,
    ) {
        let n = gradient.len();
        let pairs: Vec<RightMultiplyContext<'_, T>> = history
            .right_multiply_contexts()
            .filter(|pair| self.is_usable(pair, n))
            .collect();

        direction.copy_from(gradient);
        let mut alphas = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let rho = T::one() / pair.delta_x_dot_delta_gradient;
            let alpha = rho * pair.delta_x.dot(direction);
            direction.axpy(-alpha, pair.delta_gradient, T::one());
            alphas.push(alpha);
        }

        if let Some(scale) = initial_scale {
            if !pairs.is_empty() && Float::is_finite(scale) && scale > T::zero() {
                *direction *= scale;
            }
        }

        for (pair, alpha) in pairs.iter().zip(alphas).rev() {
            let rho = T::one() / pair.delta_x_dot_delta_gradient;
            let beta = rho * pair.delta_gradient.dot(direction);
            direction.axpy(alpha - beta, pair.delta_x, T::one());
        }

        direction.neg_mut();
        trace!(pairs = pairs.len(), "two-loop recursion complete");
    }

    fn is_usable(&self, pair: &RightMultiplyContext<'_, T>, n: usize) -> bool {
        let sy = pair.delta_x_dot_delta_gradient;
        if pair.delta_x.len() != n || pair.delta_gradient.len() != n {
            debug!(
                expected = n,
                delta_x = pair.delta_x.len(),
                delta_gradient = pair.delta_gradient.len(),
                "skipping history pair with wrong size"
            );
            return false;
        }
        if !Float::is_finite(sy) || sy <= self.config.curvature_threshold {
            debug!(delta_x_dot_delta_gradient = %sy, "skipping history pair failing the curvature condition");
            return false;
        }
        true
    }

    fn record(
        &self,
        request: &DirectionRequest<'_, T>,
        history: &mut dyn DirectionHistory<T>,
        approximate_eigenvalue_scale: &mut T,
    ) -> Result<()> {
        let step_size = request.previous_step_size;
        let delta_x = request.previous_direction * step_size;
        let delta_gradient = request.current_gradient - request.previous_gradient;
        let delta_x_dot_delta_gradient = delta_x.dot(&delta_gradient);

        if !Float::is_finite(delta_x_dot_delta_gradient)
            || delta_x_dot_delta_gradient <= self.config.curvature_threshold
        {
            debug!(
                delta_x_dot_delta_gradient = %delta_x_dot_delta_gradient,
                "skipping history update, curvature condition not satisfied"
            );
            return Ok(());
        }

        let Some(slot) = history.next_update_context(step_size) else {
            debug!(step_size = %step_size, "history declined to record this step");
            return Ok(());
        };

        check_len(delta_x.len(), slot.delta_x.len())?;
        check_len(delta_gradient.len(), slot.delta_gradient.len())?;
        slot.delta_x.copy_from(&delta_x);
        slot.delta_gradient.copy_from(&delta_gradient);
        *slot.delta_x_dot_delta_gradient = delta_x_dot_delta_gradient;

        match self
            .scaling
            .estimate(&delta_x, &delta_gradient, delta_x_dot_delta_gradient)
        {
            Some(scale) if Float::is_finite(scale) && scale > T::zero() => {
                *slot.approximate_eigenvalue_scale = scale;
                *approximate_eigenvalue_scale = scale;
            }
            estimate => {
                debug!(estimate = ?estimate, "rejecting approximate eigenvalue scale");
            }
        }

        Ok(())
    }
}
