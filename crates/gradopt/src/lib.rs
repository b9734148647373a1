//! gradopt - Gradient-only optimization problems in Rust.
//!
//! This crate re-exports the objective, problem and evaluator interfaces
//! of [`gradopt_core`] together with the retractions of
//! [`gradopt_manifolds`].
//!
//! # Example
//!
//! ```
//! use gradopt::prelude::*;
//!
//! let mut problem = GradientProblem::new(QuadraticFunction::<f64>::simple(3));
//! let mut evaluator = GradientProblemEvaluator::new(&mut problem);
//!
//! let x = DVector::from_vec(vec![1.0, 2.0, 2.0]);
//! let mut gradient = DVector::zeros(3);
//! let cost = evaluator
//!     .evaluate(&EvaluateOptions::default(), &x, None, Some(&mut gradient), None)
//!     .unwrap();
//!
//! assert_eq!(cost, 4.5);
//! assert_eq!(evaluator.num_residuals(), 1);
//! ```

pub use gradopt_core;
pub use gradopt_manifolds;
pub use nalgebra;

pub use gradopt_core::{
    FirstOrderFunction, GradientNorms, GradientProblem, ManifoldError, ObjectiveError, Result,
    Scalar,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use gradopt_core::prelude::*;
    pub use gradopt_manifolds::{
        HomogeneousVectorRetraction, ProductRetraction, QuaternionRetraction, SubsetRetraction,
    };
}
