//! Type definitions and aliases for gradient-based optimization.
//!
//! This module provides common type aliases, the trait for numeric types,
//! and the tolerances used throughout the library.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines all the necessary numeric traits required
/// by objectives, retractions and the quasi-Newton direction update.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Smallest `s·y` accepted by the curvature screen of the
    /// quasi-Newton update.
    const SECANT_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const SECANT_TOLERANCE: Self = 1e-7;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const SECANT_TOLERANCE: Self = 1e-14;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Largest absolute entry of a vector (the infinity norm).
///
/// Returns zero for an empty vector.
pub fn max_abs<T: Scalar>(v: &DVector<T>) -> T {
    v.iter()
        .map(|x| <T as Float>::abs(*x))
        .fold(T::zero(), |a, b| <T as Float>::max(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(<f64 as Scalar>::from_f64(1.5), 1.5);
        assert_eq!(<f32 as Scalar>::from_f64(0.25), 0.25f32);
    }

    #[test]
    fn test_secant_tolerance() {
        assert_eq!(<f64 as Scalar>::SECANT_TOLERANCE, 1e-14);
        assert!(<f32 as Scalar>::SECANT_TOLERANCE > 0.0);
    }

    #[test]
    fn test_max_abs() {
        let v = DVector::from_vec(vec![1.0, -4.5, 3.0]);
        assert_eq!(max_abs(&v), 4.5);
        assert_eq!(max_abs(&DVector::<f64>::zeros(0)), 0.0);
    }
}
