//! Objectives shared by tests and benchmarks.

#![cfg(any(test, feature = "test-utils"))]

use crate::core::{
    error::{check_len, ObjectiveError, Result},
    objective::FirstOrderFunction,
    types::{DVector, Scalar},
};
use num_traits::Float;

/// f(x, y) = (a - x)² + b (y - x²)², minimized at (a, a²).
#[derive(Debug, Clone, Copy)]
pub struct Rosenbrock<T> {
    /// Location parameter.
    pub a: T,
    /// Valley steepness.
    pub b: T,
}

impl<T: Scalar> Rosenbrock<T> {
    /// The classic a = 1, b = 100 instance.
    pub fn new() -> Self {
        Self {
            a: T::one(),
            b: <T as Scalar>::from_f64(100.0),
        }
    }

    /// The usual starting point (-1.2, 1).
    pub fn starting_point() -> DVector<T> {
        DVector::from_vec(vec![<T as Scalar>::from_f64(-1.2), T::one()])
    }

    /// The minimizer (a, a²).
    pub fn minimizer(&self) -> DVector<T> {
        DVector::from_vec(vec![self.a, self.a * self.a])
    }
}

impl<T: Scalar> Default for Rosenbrock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> FirstOrderFunction<T> for Rosenbrock<T> {
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T> {
        check_len(2, parameters.len())?;
        let x = parameters[0];
        let y = parameters[1];
        let two = <T as Scalar>::from_f64(2.0);

        let r = self.a - x;
        let s = y - x * x;
        let cost = r * r + self.b * s * s;
        if !Float::is_finite(cost) {
            return Err(ObjectiveError::evaluation_failed("Rosenbrock cost overflowed"));
        }

        if let Some(gradient) = gradient {
            gradient[0] = -two * r - two * two * self.b * x * s;
            gradient[1] = two * self.b * s;
        }
        Ok(cost)
    }

    fn num_parameters(&self) -> usize {
        2
    }
}

/// f(x) = 0.5 Σ d_i x_i², an axis-aligned quadratic with condition number
/// max(d) / min(d).
#[derive(Debug, Clone)]
pub struct DiagonalQuadratic<T: Scalar> {
    /// Curvature along each axis.
    pub diagonal: DVector<T>,
}

impl<T: Scalar> DiagonalQuadratic<T> {
    pub fn new(diagonal: DVector<T>) -> Self {
        Self { diagonal }
    }
}

impl<T: Scalar> FirstOrderFunction<T> for DiagonalQuadratic<T> {
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T> {
        check_len(self.diagonal.len(), parameters.len())?;
        let scaled = self.diagonal.component_mul(parameters);
        if let Some(gradient) = gradient {
            gradient.copy_from(&scaled);
        }
        Ok(scaled.dot(parameters) * <T as Scalar>::from_f64(0.5))
    }

    fn num_parameters(&self) -> usize {
        self.diagonal.len()
    }
}

/// f(x) = a · x. Over the unit sphere its minimizer is -a / |a|.
#[derive(Debug, Clone)]
pub struct LinearFunction<T: Scalar> {
    /// The vector a.
    pub coefficients: DVector<T>,
}

impl<T: Scalar> LinearFunction<T> {
    pub fn new(coefficients: DVector<T>) -> Self {
        Self { coefficients }
    }
}

impl<T: Scalar> FirstOrderFunction<T> for LinearFunction<T> {
    fn evaluate(&self, parameters: &DVector<T>, gradient: Option<&mut DVector<T>>) -> Result<T> {
        check_len(self.coefficients.len(), parameters.len())?;
        if let Some(gradient) = gradient {
            gradient.copy_from(&self.coefficients);
        }
        Ok(self.coefficients.dot(parameters))
    }

    fn num_parameters(&self) -> usize {
        self.coefficients.len()
    }
}
