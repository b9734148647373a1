//! Homogeneous vectors: points of R^n defined up to scale.
//!
//! Directions in R^n (lines through the origin, points of projective
//! space) are stored as n-vectors but only have n-1 degrees of freedom.
//! The update moves `x` along the sphere of radius ||x|| without changing
//! its norm:
//!
//! ```text
//! y = [ 0.5 sinc(|δ|/2) δ, cos(|δ|/2) ]
//! Plus(x, δ) = ||x|| H y
//! ```
//!
//! where H is the Householder reflection mapping x/||x|| onto the last
//! basis vector (and back, H being its own inverse).

use gradopt_core::{
    core::{
        error::{ManifoldError, ManifoldResult},
        types::{DMatrix, DVector, Scalar},
    },
    manifold_ops::retraction::{check_size, Retraction},
};
use num_traits::Float;

/// Norm-preserving retraction on homogeneous n-vectors (n → n-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomogeneousVectorRetraction {
    size: usize,
}

impl HomogeneousVectorRetraction {
    /// Creates the retraction for vectors of `size` entries.
    ///
    /// # Errors
    /// Returns an error if `size` < 2
    pub fn new(size: usize) -> ManifoldResult<Self> {
        if size < 2 {
            return Err(ManifoldError::invalid_point(
                "Homogeneous vectors require at least 2 entries",
            ));
        }
        Ok(Self { size })
    }
}

/// Householder vector `v` (with `v[n-1] = 1`) and coefficient `beta` such
/// that `(I - beta v vᵀ) x = ||x|| e_{n-1}`.
pub fn householder_vector<T: Scalar>(x: &DVector<T>) -> (DVector<T>, T) {
    let n = x.len();
    let sigma = x.rows(0, n - 1).norm_squared();
    let x_pivot = x[n - 1];
    let mut v = x.clone();
    v[n - 1] = T::one();

    if sigma <= T::EPSILON {
        let beta = if x_pivot < T::zero() {
            <T as Scalar>::from_f64(2.0)
        } else {
            T::zero()
        };
        return (v, beta);
    }

    let mu = <T as Float>::sqrt(x_pivot * x_pivot + sigma);
    let v_pivot = if x_pivot <= T::zero() {
        x_pivot - mu
    } else {
        -sigma / (x_pivot + mu)
    };
    let two = <T as Scalar>::from_f64(2.0);
    let beta = two * v_pivot * v_pivot / (sigma + v_pivot * v_pivot);
    for i in 0..n - 1 {
        v[i] /= v_pivot;
    }
    (v, beta)
}

impl HomogeneousVectorRetraction {
    fn check_point<T: Scalar>(&self, x: &DVector<T>) -> ManifoldResult<T> {
        check_size(self.size, x.len())?;
        let norm = x.norm();
        if !Float::is_finite(norm) {
            return Err(ManifoldError::invalid_point(
                "homogeneous vector must be finite",
            ));
        }
        if norm <= T::zero() {
            return Err(ManifoldError::numerical_error(
                "cannot normalize a zero homogeneous vector",
            ));
        }
        Ok(norm)
    }
}

impl<T: Scalar> Retraction<T> for HomogeneousVectorRetraction {
    fn name(&self) -> &str {
        "HomogeneousVector"
    }

    fn ambient_size(&self) -> usize {
        self.size
    }

    fn tangent_size(&self) -> usize {
        self.size - 1
    }

    fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        let n = self.size;
        let norm_x = self.check_point(x)?;
        check_size(n - 1, delta.len())?;
        check_size(n, x_plus_delta.len())?;

        let norm_delta = delta.norm();
        if norm_delta <= T::zero() {
            x_plus_delta.copy_from(x);
            return Ok(());
        }

        let half = <T as Scalar>::from_f64(0.5);
        let norm_delta_div_2 = half * norm_delta;
        let sin_delta_by_delta = <T as Float>::sin(norm_delta_div_2) / norm_delta_div_2;

        let mut y = DVector::zeros(n);
        for i in 0..n - 1 {
            y[i] = half * sin_delta_by_delta * delta[i];
        }
        y[n - 1] = <T as Float>::cos(norm_delta_div_2);

        let (v, beta) = householder_vector(x);
        let projection = beta * v.dot(&y);
        x_plus_delta.copy_from(&y);
        x_plus_delta.axpy(-projection, &v, T::one());
        *x_plus_delta *= norm_x;
        Ok(())
    }

    fn compute_jacobian(&self, x: &DVector<T>) -> ManifoldResult<DMatrix<T>> {
        let n = self.size;
        let norm_x = self.check_point(x)?;
        let (v, beta) = householder_vector(x);
        let half = <T as Scalar>::from_f64(0.5);

        // 0.5 ||x|| times the first n-1 columns of I - beta v vᵀ.
        let mut jacobian = DMatrix::zeros(n, n - 1);
        for j in 0..n - 1 {
            let mut column = jacobian.column_mut(j);
            column.axpy(-half * beta * v[j], &v, T::zero());
            column[j] += half;
        }
        jacobian *= norm_x;
        Ok(jacobian)
    }
}
