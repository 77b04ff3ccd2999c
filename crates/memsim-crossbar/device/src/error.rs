// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the device, array and mapping layers

use thiserror::Error;

/// Errors raised by the memristor simulation core
///
/// Every error is raised synchronously by the call that detects it. Nothing is
/// retried internally, and a call that fails leaves device state untouched.
#[derive(Debug, Error)]
pub enum MemsimError {
    /// Missing or invalid profile field, non-positive shape, unsupported structure
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value lies outside its documented domain
    #[error("Value out of range: {0}")]
    Range(String),

    /// A read voltage would leave the non-perturbing threshold window
    #[error("Read voltage {voltage} V at index {index:?} is outside the threshold window [{v_on}, {v_off}]")]
    ReadVoltageOutOfRange {
        voltage: f64,
        index: Vec<usize>,
        v_on: f64,
        v_off: f64,
    },

    /// Operand shape is incompatible with the configured array
    #[error("Shape mismatch for {operand}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        operand: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// No pulse look-up table exists for the selected device
    #[error("No pulse look-up table available for device '{0}'")]
    LookupUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for MemsimError {
    fn from(err: serde_json::Error) -> Self {
        MemsimError::Parse(err.to_string())
    }
}

impl MemsimError {
    /// Shape mismatch helper taking any slice-like dimensions
    pub fn shape_mismatch(operand: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        MemsimError::ShapeMismatch {
            operand,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, MemsimError>;
