//! gradopt Manifolds - Concrete retractions for gradient problems.
//!
//! This crate provides parameter spaces that commonly appear in
//! estimation problems, each as a [`Retraction`](gradopt_core::manifold_ops::retraction::Retraction)
//! a [`GradientProblem`](gradopt_core::GradientProblem) can be built with.
//!
//! - [`SubsetRetraction`]: some coordinates held constant
//! - [`QuaternionRetraction`]: unit quaternions (rotations), 4 → 3
//! - [`HomogeneousVectorRetraction`]: vectors defined up to scale, n → n-1
//! - [`ProductRetraction`]: blockwise composition of the above

pub mod homogeneous_vector;
pub mod product;
pub mod quaternion;
pub mod subset;

// Re-export main retractions for convenience
pub use homogeneous_vector::HomogeneousVectorRetraction;
pub use product::ProductRetraction;
pub use quaternion::QuaternionRetraction;
pub use subset::SubsetRetraction;
