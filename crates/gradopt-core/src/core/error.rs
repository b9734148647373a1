//! Error types for gradient problems and their retractions.
//!
//! `ManifoldError` covers failures of the parameter-space geometry
//! (retractions), `ObjectiveError` covers everything an objective,
//! problem or evaluator can report. A failed call is always reported
//! through these types; the only panic in the crate is a Jacobian request
//! made to a gradient-only evaluator.

use thiserror::Error;

/// Errors that can occur during manifold (retraction) operations.
#[derive(Debug, Clone, Error)]
pub enum ManifoldError {
    /// Point does not satisfy the constraints of the parameter space.
    #[error("Point is not on the manifold: {reason}")]
    InvalidPoint {
        /// Description of why the point is invalid
        reason: String,
    },

    /// Dimension mismatch between vectors or between a retraction and its point.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Numerical instability detected.
    ///
    /// This error occurs when numerical operations become unstable,
    /// such as normalizing a vector of near-zero length.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl ManifoldError {
    /// Create an InvalidPoint error with a custom reason.
    pub fn invalid_point<S: Into<String>>(reason: S) -> Self {
        Self::InvalidPoint {
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Errors reported by objectives, gradient problems and evaluators.
#[derive(Debug, Clone, Error)]
pub enum ObjectiveError {
    /// The objective could not produce a valid cost or gradient.
    ///
    /// Typical causes are a point outside the function's domain or a
    /// NaN appearing during evaluation. The minimizer decides how to recover.
    #[error("Evaluation failed: {reason}")]
    EvaluationFailed {
        /// Description of why the evaluation failed
        reason: String,
    },

    /// An optional capability is not provided by this objective.
    #[error("Capability not supported: {capability}")]
    NotSupported {
        /// Name of the missing capability
        capability: String,
    },

    /// A vector argument has the wrong length.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// No usable search direction could be produced.
    ///
    /// This is a recoverable signal: the caller falls back to steepest
    /// descent or restarts its history.
    #[error("Direction update failed: {reason}")]
    DirectionUpdateFailed {
        /// Description of why no direction was produced
        reason: String,
    },

    /// Propagated retraction error.
    #[error("Manifold operation failed: {0}")]
    Manifold(#[from] ManifoldError),
}

impl ObjectiveError {
    /// Create an EvaluationFailed error.
    pub fn evaluation_failed<S: Into<String>>(reason: S) -> Self {
        Self::EvaluationFailed {
            reason: reason.into(),
        }
    }

    /// Create a NotSupported error for a named capability.
    pub fn not_supported<S: Into<String>>(capability: S) -> Self {
        Self::NotSupported {
            capability: capability.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create a DirectionUpdateFailed error.
    pub fn direction_update_failed<S: Into<String>>(reason: S) -> Self {
        Self::DirectionUpdateFailed {
            reason: reason.into(),
        }
    }

    /// Returns true if this error only signals an absent optional capability.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }
}

/// Result type alias for objective, problem and evaluator operations.
pub type Result<T> = std::result::Result<T, ObjectiveError>;

/// Result type alias for retraction operations.
pub type ManifoldResult<T> = std::result::Result<T, ManifoldError>;

/// Checks that a vector argument has the expected length.
pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ObjectiveError::dimension_mismatch(expected, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifold_error_creation() {
        let err = ManifoldError::invalid_point("quaternion has zero norm");
        assert!(matches!(err, ManifoldError::InvalidPoint { .. }));
        assert_eq!(
            err.to_string(),
            "Point is not on the manifold: quaternion has zero norm"
        );

        let err = ManifoldError::dimension_mismatch(4, 3);
        assert_eq!(err.to_string(), "Dimension mismatch: expected 4, got 3");
    }

    #[test]
    fn test_objective_error_creation() {
        let err = ObjectiveError::evaluation_failed("log of negative number");
        assert!(err.to_string().contains("Evaluation failed"));
        assert!(!err.is_not_supported());

        let err = ObjectiveError::not_supported("next_direction");
        assert!(err.is_not_supported());
        assert_eq!(err.to_string(), "Capability not supported: next_direction");

        let err = ObjectiveError::dimension_mismatch(2, 3);
        assert!(matches!(
            err,
            ObjectiveError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_manifold_error_propagation() {
        let manifold_err = ManifoldError::numerical_error("zero-length vector");
        let err: ObjectiveError = manifold_err.into();

        assert!(matches!(err, ObjectiveError::Manifold(_)));
        assert!(err.to_string().contains("Manifold operation failed"));
        assert!(err.to_string().contains("zero-length vector"));
    }

    #[test]
    fn test_check_len() {
        assert!(check_len(3, 3).is_ok());
        assert!(matches!(
            check_len(3, 2),
            Err(ObjectiveError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            ObjectiveError::evaluation_failed("NaN in cost"),
            ObjectiveError::not_supported("evaluate_gradient_norms"),
            ObjectiveError::dimension_mismatch(5, 4),
            ObjectiveError::direction_update_failed("not a descent direction"),
            ObjectiveError::Manifold(ManifoldError::invalid_point("not unit norm")),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
