//! Core traits and types for gradient-based optimization.

pub mod error;
pub mod gradient_problem;
pub mod objective;
pub mod types;

// Re-export core types
pub use error::*;
pub use gradient_problem::*;
pub use objective::*;
pub use types::*;
