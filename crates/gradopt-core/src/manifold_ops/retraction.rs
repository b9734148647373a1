//! Retractions for optimizing over non-Euclidean parameter spaces.
//!
//! A retraction maps an update expressed in a tangent space back to the
//! ambient parameter space. The minimizer works with tangent updates of
//! size `tangent_size` while the objective sees ambient points of size
//! `ambient_size`.
//!
//! # Mathematical Background
//!
//! A retraction Plus: (x, δ) ↦ x ⊞ δ must satisfy
//! - Plus(x, 0) = x (centering condition)
//! - its Jacobian J = ∂Plus(x, δ)/∂δ at δ = 0 has full column rank.
//!
//! J (of shape `ambient_size × tangent_size`) pulls an ambient gradient g
//! back into the tangent space as Jᵀ g.

use crate::core::{
    error::{ManifoldError, ManifoldResult},
    types::{max_abs, DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;

/// Trait for retractions.
pub trait Retraction<T: Scalar>: Debug {
    /// Returns the name of this retraction.
    fn name(&self) -> &str;

    /// Size of the ambient representation of a point.
    fn ambient_size(&self) -> usize;

    /// Size of a tangent update. Never larger than `ambient_size`.
    fn tangent_size(&self) -> usize;

    /// Computes `x_plus_delta = Plus(x, delta)`.
    fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> ManifoldResult<()>;

    /// Computes the Jacobian of `Plus(x, delta)` with respect to `delta`
    /// at `delta = 0`, an `ambient_size × tangent_size` matrix.
    fn compute_jacobian(&self, x: &DVector<T>) -> ManifoldResult<DMatrix<T>>;

    /// Maps an ambient gradient into the tangent space: `local = Jᵀ global`.
    ///
    /// The default forms the Jacobian explicitly.
    fn multiply_by_jacobian(
        &self,
        x: &DVector<T>,
        global: &DVector<T>,
        local: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(self.ambient_size(), global.len())?;
        check_size(self.tangent_size(), local.len())?;
        let jacobian = self.compute_jacobian(x)?;
        jacobian.tr_mul_to(global, local);
        Ok(())
    }
}

impl<T: Scalar, R: Retraction<T> + ?Sized> Retraction<T> for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn ambient_size(&self) -> usize {
        (**self).ambient_size()
    }

    fn tangent_size(&self) -> usize {
        (**self).tangent_size()
    }

    fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        (**self).plus(x, delta, x_plus_delta)
    }

    fn compute_jacobian(&self, x: &DVector<T>) -> ManifoldResult<DMatrix<T>> {
        (**self).compute_jacobian(x)
    }

    fn multiply_by_jacobian(
        &self,
        x: &DVector<T>,
        global: &DVector<T>,
        local: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        (**self).multiply_by_jacobian(x, global, local)
    }
}

/// Ordinary vector addition over the full ambient space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EuclideanRetraction {
    size: usize,
}

impl EuclideanRetraction {
    /// Creates the identity retraction on R^size.
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl<T: Scalar> Retraction<T> for EuclideanRetraction {
    fn name(&self) -> &str {
        "Euclidean"
    }

    fn ambient_size(&self) -> usize {
        self.size
    }

    fn tangent_size(&self) -> usize {
        self.size
    }

    fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(self.size, x.len())?;
        check_size(self.size, delta.len())?;
        check_size(self.size, x_plus_delta.len())?;
        x_plus_delta.copy_from(x);
        *x_plus_delta += delta;
        Ok(())
    }

    fn compute_jacobian(&self, x: &DVector<T>) -> ManifoldResult<DMatrix<T>> {
        check_size(self.size, x.len())?;
        Ok(DMatrix::identity(self.size, self.size))
    }

    fn multiply_by_jacobian(
        &self,
        _x: &DVector<T>,
        global: &DVector<T>,
        local: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(self.size, global.len())?;
        check_size(self.size, local.len())?;
        local.copy_from(global);
        Ok(())
    }
}

/// Checks that a vector has the size a retraction expects.
pub fn check_size(expected: usize, actual: usize) -> ManifoldResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ManifoldError::dimension_mismatch(expected, actual))
    }
}

/// Numerical checks for retraction implementations.
pub struct RetractionVerifier;

impl RetractionVerifier {
    /// Verifies the centering condition Plus(x, 0) = x.
    ///
    /// Returns (passes, max_error).
    pub fn verify_centering<T, R>(retraction: &R, x: &DVector<T>, tol: T) -> ManifoldResult<(bool, T)>
    where
        T: Scalar,
        R: Retraction<T> + ?Sized,
    {
        let zero = DVector::zeros(retraction.tangent_size());
        let mut result = DVector::zeros(retraction.ambient_size());
        retraction.plus(x, &zero, &mut result)?;

        let error = max_abs(&(result - x));
        Ok((error < tol, error))
    }

    /// Verifies `compute_jacobian` against forward differences of `plus`.
    ///
    /// Returns (passes, max_error).
    pub fn verify_jacobian<T, R>(retraction: &R, x: &DVector<T>, tol: T) -> ManifoldResult<(bool, T)>
    where
        T: Scalar,
        R: Retraction<T> + ?Sized,
    {
        let n = retraction.ambient_size();
        let k = retraction.tangent_size();
        let jacobian = retraction.compute_jacobian(x)?;
        if jacobian.nrows() != n || jacobian.ncols() != k {
            return Err(ManifoldError::dimension_mismatch(
                format!("{n}x{k}"),
                format!("{}x{}", jacobian.nrows(), jacobian.ncols()),
            ));
        }

        let h = <T as Float>::sqrt(T::EPSILON);
        let mut base = DVector::zeros(n);
        retraction.plus(x, &DVector::zeros(k), &mut base)?;

        let mut delta = DVector::zeros(k);
        let mut moved = DVector::zeros(n);
        let mut max_error = T::zero();
        for j in 0..k {
            delta[j] = h;
            retraction.plus(x, &delta, &mut moved)?;
            delta[j] = T::zero();

            for i in 0..n {
                let fd = (moved[i] - base[i]) / h;
                let error = <T as Float>::abs(fd - jacobian[(i, j)]);
                max_error = <T as Float>::max(max_error, error);
            }
        }

        Ok((max_error < tol, max_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_plus() {
        let retraction = EuclideanRetraction::new(3);
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let delta = DVector::from_vec(vec![0.5, -1.0, 0.25]);
        let mut result = DVector::zeros(3);

        retraction.plus(&x, &delta, &mut result).unwrap();
        assert_relative_eq!(result, DVector::from_vec(vec![1.5, 1.0, 3.25]));
        assert_eq!(Retraction::<f64>::tangent_size(&retraction), 3);
    }

    #[test]
    fn test_euclidean_rejects_wrong_size() {
        let retraction = EuclideanRetraction::new(3);
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let mut result = DVector::zeros(3);

        let err = retraction.plus(&x, &DVector::zeros(3), &mut result).unwrap_err();
        assert!(matches!(err, ManifoldError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_euclidean_jacobian_is_identity() {
        let retraction = EuclideanRetraction::new(2);
        let x = DVector::from_vec(vec![0.3, -0.2]);
        let jacobian = retraction.compute_jacobian(&x).unwrap();
        assert_eq!(jacobian, DMatrix::identity(2, 2));

        let (passes, _) = RetractionVerifier::verify_jacobian(&retraction, &x, 1e-6).unwrap();
        assert!(passes);
    }

    #[test]
    fn test_verifier_centering() {
        let retraction = EuclideanRetraction::new(4);
        let x = DVector::from_vec(vec![1.0, -1.0, 2.0, 0.0]);
        let (passes, error) = RetractionVerifier::verify_centering(&retraction, &x, 1e-12).unwrap();
        assert!(passes);
        assert_eq!(error, 0.0);
    }

    #[test]
    fn test_default_multiply_by_jacobian() {
        // Scales the single tangent coordinate onto both ambient coordinates.
        #[derive(Debug)]
        struct Diagonal;

        impl Retraction<f64> for Diagonal {
            fn name(&self) -> &str {
                "Diagonal"
            }
            fn ambient_size(&self) -> usize {
                2
            }
            fn tangent_size(&self) -> usize {
                1
            }
            fn plus(
                &self,
                x: &DVector<f64>,
                delta: &DVector<f64>,
                x_plus_delta: &mut DVector<f64>,
            ) -> ManifoldResult<()> {
                x_plus_delta[0] = x[0] + delta[0];
                x_plus_delta[1] = x[1] + 2.0 * delta[0];
                Ok(())
            }
            fn compute_jacobian(&self, _x: &DVector<f64>) -> ManifoldResult<DMatrix<f64>> {
                Ok(DMatrix::from_column_slice(2, 1, &[1.0, 2.0]))
            }
        }

        let x = DVector::from_vec(vec![0.0, 0.0]);
        let global = DVector::from_vec(vec![3.0, 5.0]);
        let mut local = DVector::zeros(1);
        Diagonal.multiply_by_jacobian(&x, &global, &mut local).unwrap();
        assert_relative_eq!(local[0], 13.0);

        let (passes, _) = RetractionVerifier::verify_jacobian(&Diagonal, &x, 1e-6).unwrap();
        assert!(passes);
    }
}
