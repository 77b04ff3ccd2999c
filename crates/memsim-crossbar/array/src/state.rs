// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-device, per-batch-element drift state

use ndarray::Array3;

/// Normalized state `x ∈ [0, 1]` and last applied elapsed time, both `[batch, rows, cols]`
#[derive(Debug, Clone, PartialEq)]
pub struct ConductanceState {
    pub(crate) x: Array3<f64>,
    pub(crate) t: Array3<f64>,
}

impl ConductanceState {
    /// Every device off (`x = 0`) at `t = 0`
    pub fn new(batch_size: usize, rows: usize, cols: usize) -> Self {
        Self {
            x: Array3::zeros((batch_size, rows, cols)),
            t: Array3::zeros((batch_size, rows, cols)),
        }
    }

    /// Normalized drift state
    pub fn x(&self) -> &Array3<f64> {
        &self.x
    }

    /// Elapsed simulation time of the last write (s)
    pub fn elapsed(&self) -> &Array3<f64> {
        &self.t
    }

    /// Latest elapsed time across all devices
    pub fn max_elapsed(&self) -> f64 {
        self.t.iter().copied().fold(0.0, f64::max)
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.x.dim()
    }
}
