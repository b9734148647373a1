//! Bounded history of quasi-Newton correction pairs.
//!
//! [`LimitedMemoryHistory`] is the storage a line-search minimizer keeps
//! between iterations and lends to a direction update through the
//! [`DirectionHistory`] trait. All slots are allocated up front; once the
//! history is full, recording a new pair overwrites the oldest one.

use crate::{
    core::types::{DVector, Scalar},
    optimization::direction::{DirectionHistory, DirectionUpdateContext, RightMultiplyContext},
};
use num_traits::Float;
use std::collections::VecDeque;
use tracing::trace;

/// FIFO ring buffer of up to `m` pairs `(s_i, y_i)` with their `s_i·y_i`.
#[derive(Debug, Clone)]
pub struct LimitedMemoryHistory<T: Scalar> {
    delta_x: Vec<DVector<T>>,
    delta_gradient: Vec<DVector<T>>,
    delta_x_dot_delta_gradient: Vec<T>,
    approximate_eigenvalue_scale: Vec<T>,
    /// Slot indices, oldest first.
    order: VecDeque<usize>,
    num_parameters: usize,
}

impl<T: Scalar> LimitedMemoryHistory<T> {
    /// Creates an empty history for vectors of `num_parameters` entries
    /// holding at most `max_num_corrections` pairs.
    pub fn new(num_parameters: usize, max_num_corrections: usize) -> Self {
        Self {
            delta_x: vec![DVector::zeros(num_parameters); max_num_corrections],
            delta_gradient: vec![DVector::zeros(num_parameters); max_num_corrections],
            delta_x_dot_delta_gradient: vec![T::zero(); max_num_corrections],
            approximate_eigenvalue_scale: vec![T::one(); max_num_corrections],
            order: VecDeque::with_capacity(max_num_corrections),
            num_parameters,
        }
    }

    /// Maximum number of stored pairs.
    pub fn max_num_corrections(&self) -> usize {
        self.delta_x.len()
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no pair is stored.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forgets every stored pair, e.g. when the minimizer restarts.
    pub fn reset(&mut self) {
        self.order.clear();
    }

    /// Eigenvalue scale recorded with the newest pair.
    pub fn latest_eigenvalue_scale(&self) -> Option<T> {
        self.order
            .back()
            .map(|&slot| self.approximate_eigenvalue_scale[slot])
    }
}

impl<T: Scalar> DirectionHistory<T> for LimitedMemoryHistory<T> {
    fn num_parameters(&self) -> usize {
        self.num_parameters
    }

    fn next_update_context(&mut self, step_size: T) -> Option<DirectionUpdateContext<'_, T>> {
        let capacity = self.max_num_corrections();
        if capacity == 0 || !Float::is_finite(step_size) || step_size <= T::zero() {
            return None;
        }

        let slot = if self.order.len() < capacity {
            self.order.len()
        } else {
            self.order.pop_front()?
        };
        self.order.push_back(slot);
        trace!(slot, stored = self.order.len(), "recording history pair");

        Some(DirectionUpdateContext {
            delta_x: &mut self.delta_x[slot],
            delta_gradient: &mut self.delta_gradient[slot],
            delta_x_dot_delta_gradient: &mut self.delta_x_dot_delta_gradient[slot],
            approximate_eigenvalue_scale: &mut self.approximate_eigenvalue_scale[slot],
        })
    }

    fn right_multiply_contexts(&self) -> Box<dyn Iterator<Item = RightMultiplyContext<'_, T>> + '_> {
        Box::new(self.order.iter().rev().map(move |&slot| RightMultiplyContext {
            delta_x: &self.delta_x[slot],
            delta_gradient: &self.delta_gradient[slot],
            delta_x_dot_delta_gradient: self.delta_x_dot_delta_gradient[slot],
        }))
    }
}
