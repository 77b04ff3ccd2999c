// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-batch simulation step counter

use memsim_crossbar_device::{MemsimError, Result};
use ndarray::Array3;

/// Step counter and elapsed-time base for each batch element.
///
/// Elapsed time is `base + step · delta_t`. Rewinding the step counter moves the
/// base forward so that the elapsed time handed to the array never decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct StepClock {
    delta_t: f64,
    steps: Vec<u64>,
    base: Vec<f64>,
    /// Elapsed time at the last rewind; absorbs rounding in `base`
    floor: Vec<f64>,
}

impl StepClock {
    pub fn new(batch_size: usize, delta_t: f64) -> Self {
        Self {
            delta_t,
            steps: vec![0; batch_size],
            base: vec![0.0; batch_size],
            floor: vec![0.0; batch_size],
        }
    }

    pub fn steps(&self) -> &[u64] {
        &self.steps
    }

    pub fn batch_size(&self) -> usize {
        self.steps.len()
    }

    /// Elapsed time per batch element, shaped `[batch, 1, 1]`
    pub fn elapsed(&self) -> Array3<f64> {
        Array3::from_shape_fn((self.steps.len(), 1, 1), |(b, _, _)| self.current(b))
    }

    /// One step forward for every batch element
    pub fn advance(&mut self) {
        for step in &mut self.steps {
            *step += 1;
        }
    }

    /// Set the step counter of every batch element
    pub fn set_steps(&mut self, steps: &[u64]) -> Result<()> {
        if steps.len() != self.steps.len() {
            return Err(MemsimError::shape_mismatch(
                "step counter",
                &[self.steps.len()],
                &[steps.len()],
            ));
        }
        for (b, &step) in steps.iter().enumerate() {
            self.move_to(b, step);
        }
        Ok(())
    }

    /// Set every batch element to the same step
    pub fn rewind(&mut self, step: u64) {
        for b in 0..self.steps.len() {
            self.move_to(b, step);
        }
    }

    fn current(&self, b: usize) -> f64 {
        self.floor[b]
            .max(self.base[b] + self.steps[b] as f64 * self.delta_t)
    }

    fn move_to(&mut self, b: usize, step: u64) {
        let now = self.current(b);
        self.base[b] = self.base[b].max(now - step as f64 * self.delta_t);
        self.floor[b] = now;
        self.steps[b] = step;
    }
}
