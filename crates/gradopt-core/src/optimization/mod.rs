//! Quasi-Newton search directions and the history they are built from.

pub mod direction;
pub mod history;
pub mod quasi_newton;

// Re-export optimization components
pub use direction::*;
pub use history::*;
pub use quasi_newton::*;
