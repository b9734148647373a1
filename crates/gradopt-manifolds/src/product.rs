//! Product of retractions.
//!
//! A point of the product space is the concatenation of one point per
//! factor, and a tangent update the concatenation of one update per
//! factor. `Plus` acts blockwise and the Jacobian is block diagonal.
//!
//! # Example
//!
//! ```
//! use gradopt_manifolds::{ProductRetraction, QuaternionRetraction, SubsetRetraction};
//! use gradopt_core::manifold_ops::retraction::{EuclideanRetraction, Retraction};
//!
//! // A pose: unit quaternion followed by a translation.
//! let pose = ProductRetraction::<f64>::new(vec![
//!     Box::new(QuaternionRetraction::new()),
//!     Box::new(EuclideanRetraction::new(3)),
//! ])
//! .unwrap();
//! assert_eq!(pose.ambient_size(), 7);
//! assert_eq!(pose.tangent_size(), 6);
//! ```

use gradopt_core::{
    core::{
        error::{ManifoldError, ManifoldResult},
        types::{DMatrix, DVector, Scalar},
    },
    manifold_ops::retraction::{check_size, Retraction},
};

/// Cartesian product of retractions.
#[derive(Debug)]
pub struct ProductRetraction<T: Scalar> {
    factors: Vec<Box<dyn Retraction<T>>>,
    ambient_size: usize,
    tangent_size: usize,
}

impl<T: Scalar> ProductRetraction<T> {
    /// Creates the product of `factors`, in order.
    ///
    /// # Errors
    /// Returns an error if `factors` is empty
    pub fn new(factors: Vec<Box<dyn Retraction<T>>>) -> ManifoldResult<Self> {
        if factors.is_empty() {
            return Err(ManifoldError::invalid_point(
                "Product retraction requires at least one factor",
            ));
        }
        let ambient_size = factors.iter().map(|f| f.ambient_size()).sum();
        let tangent_size = factors.iter().map(|f| f.tangent_size()).sum();
        Ok(Self {
            factors,
            ambient_size,
            tangent_size,
        })
    }

    /// Number of factors.
    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    /// Visits every factor with its (ambient, tangent) offsets.
    fn blocks(&self) -> impl Iterator<Item = (&dyn Retraction<T>, usize, usize)> + '_ {
        self.factors.iter().scan((0, 0), |offsets, factor| {
            let (ambient, tangent) = *offsets;
            offsets.0 += factor.ambient_size();
            offsets.1 += factor.tangent_size();
            Some((factor.as_ref(), ambient, tangent))
        })
    }
}

impl<T: Scalar> Retraction<T> for ProductRetraction<T> {
    fn name(&self) -> &str {
        "Product"
    }

    fn ambient_size(&self) -> usize {
        self.ambient_size
    }

    fn tangent_size(&self) -> usize {
        self.tangent_size
    }

    fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(self.ambient_size, x.len())?;
        check_size(self.tangent_size, delta.len())?;
        check_size(self.ambient_size, x_plus_delta.len())?;

        for (factor, ambient, tangent) in self.blocks() {
            let n = factor.ambient_size();
            let k = factor.tangent_size();
            let x_block = x.rows(ambient, n).clone_owned();
            let delta_block = delta.rows(tangent, k).clone_owned();
            let mut out_block = DVector::zeros(n);
            factor.plus(&x_block, &delta_block, &mut out_block)?;
            x_plus_delta.rows_mut(ambient, n).copy_from(&out_block);
        }
        Ok(())
    }

    fn compute_jacobian(&self, x: &DVector<T>) -> ManifoldResult<DMatrix<T>> {
        check_size(self.ambient_size, x.len())?;

        let mut jacobian = DMatrix::zeros(self.ambient_size, self.tangent_size);
        for (factor, ambient, tangent) in self.blocks() {
            let n = factor.ambient_size();
            let k = factor.tangent_size();
            let block = factor.compute_jacobian(&x.rows(ambient, n).clone_owned())?;
            jacobian.view_mut((ambient, tangent), (n, k)).copy_from(&block);
        }
        Ok(jacobian)
    }

    fn multiply_by_jacobian(
        &self,
        x: &DVector<T>,
        global: &DVector<T>,
        local: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(self.ambient_size, x.len())?;
        check_size(self.ambient_size, global.len())?;
        check_size(self.tangent_size, local.len())?;

        for (factor, ambient, tangent) in self.blocks() {
            let n = factor.ambient_size();
            let k = factor.tangent_size();
            let mut local_block = DVector::zeros(k);
            factor.multiply_by_jacobian(
                &x.rows(ambient, n).clone_owned(),
                &global.rows(ambient, n).clone_owned(),
                &mut local_block,
            )?;
            local.rows_mut(tangent, k).copy_from(&local_block);
        }
        Ok(())
    }
}
