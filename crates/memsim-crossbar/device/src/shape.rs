// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Array geometry

use std::fmt;

use crate::error::{MemsimError, Result};

/// Rows × columns of a crossbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayShape {
    pub rows: usize,
    pub cols: usize,
}

impl ArrayShape {
    /// Both dimensions must be positive
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MemsimError::Configuration(format!(
                "array shape must have positive dimensions, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self { rows, cols })
    }

    /// Single-row shape holding `len` devices
    pub fn row(len: usize) -> Result<Self> {
        Self::new(1, len)
    }

    pub fn device_count(&self) -> usize {
        self.rows * self.cols
    }

    /// `(row, col)` of the device at `index` in row-major order
    pub fn coordinate(&self, index: usize) -> Result<DeviceCoordinate> {
        if index >= self.device_count() {
            return Err(MemsimError::Range(format!(
                "device index {} outside a {} array",
                index, self
            )));
        }
        Ok(DeviceCoordinate {
            row: index / self.cols,
            col: index % self.cols,
        })
    }

    pub fn as_tuple(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Position of one device in its array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCoordinate {
    pub row: usize,
    pub col: usize,
}
