// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Traits shared by drift models

/// Window exponents of one device
///
/// Either the profile's nominal `P_on`/`P_off` or a device's persisted
/// device-to-device draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowExponents {
    pub p_on: f64,
    pub p_off: f64,
}

impl WindowExponents {
    pub fn new(p_on: f64, p_off: f64) -> Self {
        Self { p_on, p_off }
    }
}

/// Model-specific parameter set
pub trait ModelParameters {
    /// Check parameter invariants
    fn validate(&self) -> Result<(), &'static str>;

    /// Number of scalar parameters the model reads
    fn parameter_count() -> usize;
}

/// State drift model for a single device
pub trait DriftModel {
    type Parameters: ModelParameters;

    fn model_name(&self) -> &'static str;

    /// Advance `x` by one step under `voltage`.
    ///
    /// The returned state is clamped to `[0, 1]`.
    fn step(&self, x: f64, voltage: f64, window: WindowExponents, params: &Self::Parameters)
        -> f64;
}
