//! Gradient problems: an objective together with its parameter space.
//!
//! A [`GradientProblem`] exclusively owns a [`FirstOrderFunction`] and,
//! optionally, a [`Retraction`]. Without a retraction the parameter space
//! is Euclidean and updates are ordinary vector addition.
//!
//! With a retraction the objective still sees ambient points, but the
//! minimizer works in the tangent space: [`GradientProblem::evaluate`]
//! returns the gradient pulled back through the retraction's Jacobian,
//! which has `num_local_parameters` entries.

use crate::{
    core::{
        error::{check_len, ObjectiveError, Result},
        objective::{FirstOrderFunction, GradientNorms},
        types::{DVector, Scalar},
    },
    manifold_ops::retraction::Retraction,
    optimization::direction::{DirectionHistory, DirectionRequest},
};

/// An objective minimized from its value and gradient, possibly over a
/// non-Euclidean parameter space.
///
/// Evaluation takes `&mut self`: the problem reuses one scratch buffer of
/// `num_parameters` entries, allocated at construction, across calls.
#[derive(Debug)]
pub struct GradientProblem<T: Scalar> {
    function: Box<dyn FirstOrderFunction<T>>,
    retraction: Option<Box<dyn Retraction<T>>>,
    scratch: DVector<T>,
}

impl<T: Scalar> GradientProblem<T> {
    /// Creates a problem over Euclidean space, taking ownership of the function.
    pub fn new<F>(function: F) -> Self
    where
        F: FirstOrderFunction<T> + 'static,
    {
        let n = function.num_parameters();
        Self {
            function: Box::new(function),
            retraction: None,
            scratch: DVector::zeros(n),
        }
    }

    /// Creates a problem whose parameters live on the space described by
    /// `retraction`, taking ownership of both.
    ///
    /// Fails if the retraction's ambient size differs from the function's
    /// parameter count, or if its tangent size is larger.
    pub fn with_retraction<F, R>(function: F, retraction: R) -> Result<Self>
    where
        F: FirstOrderFunction<T> + 'static,
        R: Retraction<T> + 'static,
    {
        let n = function.num_parameters();
        check_len(n, retraction.ambient_size())?;
        if retraction.tangent_size() > n {
            return Err(ObjectiveError::dimension_mismatch(n, retraction.tangent_size()));
        }
        Ok(Self {
            function: Box::new(function),
            retraction: Some(Box::new(retraction)),
            scratch: DVector::zeros(n),
        })
    }

    /// Number of ambient parameters.
    pub fn num_parameters(&self) -> usize {
        self.function.num_parameters()
    }

    /// Number of tangent-space parameters; equals `num_parameters` without
    /// a retraction.
    pub fn num_local_parameters(&self) -> usize {
        self.retraction
            .as_ref()
            .map_or_else(|| self.num_parameters(), |r| r.tangent_size())
    }

    /// Evaluates the cost and, if requested, the (tangent-space) gradient.
    ///
    /// Not reentrant: the scratch buffer is overwritten by every call.
    pub fn evaluate(
        &mut self,
        parameters: &DVector<T>,
        gradient: Option<&mut DVector<T>>,
    ) -> Result<T> {
        check_len(self.num_parameters(), parameters.len())?;
        if let Some(g) = gradient.as_deref() {
            check_len(self.num_local_parameters(), g.len())?;
        }

        let (retraction, gradient) = match (self.retraction.as_ref(), gradient) {
            (Some(retraction), Some(gradient)) => (retraction, gradient),
            (_, gradient) => return self.function.evaluate(parameters, gradient),
        };

        let cost = self.function.evaluate(parameters, Some(&mut self.scratch))?;
        retraction.multiply_by_jacobian(parameters, &self.scratch, gradient)?;
        Ok(cost)
    }

    /// Computes `x_plus_delta = Plus(x, delta)`.
    ///
    /// Falls back to `x + delta` when no retraction is configured.
    pub fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> Result<()> {
        match &self.retraction {
            Some(retraction) => Ok(retraction.plus(x, delta, x_plus_delta)?),
            None => {
                let n = self.num_parameters();
                check_len(n, x.len())?;
                check_len(n, delta.len())?;
                check_len(n, x_plus_delta.len())?;
                x_plus_delta.copy_from(x);
                *x_plus_delta += delta;
                Ok(())
            }
        }
    }

    /// Forwards to the function's gradient-norm capability.
    ///
    /// `None` means unsupported; this type deliberately does not compute
    /// a fallback.
    pub fn evaluate_gradient_norms(
        &self,
        x: &DVector<T>,
        gradient: &DVector<T>,
    ) -> Option<GradientNorms<T>> {
        self.function.evaluate_gradient_norms(x, gradient)
    }

    /// Forwards to the function's quasi-Newton direction capability.
    pub fn next_direction(
        &self,
        request: &DirectionRequest<'_, T>,
        history: &mut dyn DirectionHistory<T>,
        approximate_eigenvalue_scale: &mut T,
        direction: &mut DVector<T>,
    ) -> Result<T> {
        self.function
            .next_direction(request, history, approximate_eigenvalue_scale, direction)
    }

    /// The owned function.
    pub fn function(&self) -> &dyn FirstOrderFunction<T> {
        self.function.as_ref()
    }

    /// The owned retraction, if any.
    pub fn retraction(&self) -> Option<&dyn Retraction<T>> {
        self.retraction.as_deref()
    }
}
