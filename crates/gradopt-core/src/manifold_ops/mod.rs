//! Parameter-space operations.

pub mod retraction;

pub use retraction::*;
