//! Unit quaternions S^3 ⊂ R^4, stored as `[w, x, y, z]`.
//!
//! Rotations parameterized by unit quaternions are optimized with a
//! three-dimensional update: the tangent vector δ is turned into the
//! quaternion exp(δ) = [cos|δ|, sin|δ| δ/|δ|] and composed on the left,
//!
//! ```text
//! Plus(q, δ) = exp(δ) ⊗ q
//! ```
//!
//! The result stays unit norm whenever `q` is.

use gradopt_core::{
    core::{
        error::ManifoldResult,
        types::{DMatrix, DVector, Scalar},
    },
    manifold_ops::retraction::{check_size, Retraction},
};
use num_traits::Float;

/// Left-multiplicative retraction on unit quaternions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuaternionRetraction;

impl QuaternionRetraction {
    /// Creates the retraction.
    pub fn new() -> Self {
        Self
    }
}

/// Hamilton product `a ⊗ b` of two `[w, x, y, z]` quaternions.
pub fn quaternion_product<T: Scalar>(a: &[T; 4], b: &[T; 4], out: &mut DVector<T>) {
    out[0] = a[0] * b[0] - a[1] * b[1] - a[2] * b[2] - a[3] * b[3];
    out[1] = a[0] * b[1] + a[1] * b[0] + a[2] * b[3] - a[3] * b[2];
    out[2] = a[0] * b[2] - a[1] * b[3] + a[2] * b[0] + a[3] * b[1];
    out[3] = a[0] * b[3] + a[1] * b[2] - a[2] * b[1] + a[3] * b[0];
}

impl<T: Scalar> Retraction<T> for QuaternionRetraction {
    fn name(&self) -> &str {
        "Quaternion"
    }

    fn ambient_size(&self) -> usize {
        4
    }

    fn tangent_size(&self) -> usize {
        3
    }

    fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(4, x.len())?;
        check_size(3, delta.len())?;
        check_size(4, x_plus_delta.len())?;

        let norm_delta = delta.norm();
        if norm_delta <= T::zero() {
            x_plus_delta.copy_from(x);
            return Ok(());
        }

        let sin_delta_by_delta = <T as Float>::sin(norm_delta) / norm_delta;
        let q_delta = [
            <T as Float>::cos(norm_delta),
            sin_delta_by_delta * delta[0],
            sin_delta_by_delta * delta[1],
            sin_delta_by_delta * delta[2],
        ];
        let q = [x[0], x[1], x[2], x[3]];
        quaternion_product(&q_delta, &q, x_plus_delta);
        Ok(())
    }

    fn compute_jacobian(&self, x: &DVector<T>) -> ManifoldResult<DMatrix<T>> {
        check_size(4, x.len())?;
        #[rustfmt::skip]
        let jacobian = DMatrix::from_row_slice(4, 3, &[
            -x[1], -x[2], -x[3],
             x[0],  x[3], -x[2],
            -x[3],  x[0],  x[1],
             x[2], -x[1],  x[0],
        ]);
        Ok(jacobian)
    }
}
