//! Holding a subset of the parameters constant.

use gradopt_core::{
    core::{
        error::{ManifoldError, ManifoldResult},
        types::{DMatrix, DVector, Scalar},
    },
    manifold_ops::retraction::{check_size, Retraction},
};

/// Euclidean update on every coordinate except a fixed set of constant
/// ones.
///
/// The tangent space has one entry per free coordinate, in increasing
/// index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetRetraction {
    size: usize,
    /// Indices of the free coordinates, ascending.
    free: Vec<usize>,
}

impl SubsetRetraction {
    /// Creates the retraction on R^size holding `constant_parameters` fixed.
    ///
    /// # Errors
    /// Returns an error if an index is repeated or out of range.
    pub fn new(size: usize, constant_parameters: &[usize]) -> ManifoldResult<Self> {
        let mut is_constant = vec![false; size];
        for &index in constant_parameters {
            if index >= size {
                return Err(ManifoldError::invalid_point(format!(
                    "constant parameter index {index} out of range for size {size}"
                )));
            }
            if is_constant[index] {
                return Err(ManifoldError::invalid_point(format!(
                    "constant parameter index {index} given twice"
                )));
            }
            is_constant[index] = true;
        }

        let free = (0..size).filter(|&i| !is_constant[i]).collect();
        Ok(Self { size, free })
    }

    /// Indices of the coordinates that move.
    pub fn free_parameters(&self) -> &[usize] {
        &self.free
    }
}

impl<T: Scalar> Retraction<T> for SubsetRetraction {
    fn name(&self) -> &str {
        "Subset"
    }

    fn ambient_size(&self) -> usize {
        self.size
    }

    fn tangent_size(&self) -> usize {
        self.free.len()
    }

    fn plus(
        &self,
        x: &DVector<T>,
        delta: &DVector<T>,
        x_plus_delta: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(self.size, x.len())?;
        check_size(self.free.len(), delta.len())?;
        check_size(self.size, x_plus_delta.len())?;

        x_plus_delta.copy_from(x);
        for (k, &i) in self.free.iter().enumerate() {
            x_plus_delta[i] += delta[k];
        }
        Ok(())
    }

    fn compute_jacobian(&self, x: &DVector<T>) -> ManifoldResult<DMatrix<T>> {
        check_size(self.size, x.len())?;
        let mut jacobian = DMatrix::zeros(self.size, self.free.len());
        for (k, &i) in self.free.iter().enumerate() {
            jacobian[(i, k)] = T::one();
        }
        Ok(jacobian)
    }

    fn multiply_by_jacobian(
        &self,
        _x: &DVector<T>,
        global: &DVector<T>,
        local: &mut DVector<T>,
    ) -> ManifoldResult<()> {
        check_size(self.size, global.len())?;
        check_size(self.free.len(), local.len())?;
        for (k, &i) in self.free.iter().enumerate() {
            local[k] = global[i];
        }
        Ok(())
    }
}
