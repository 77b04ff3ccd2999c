// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # VTEAM Threshold Drift Model
//!
//! Voltage-controlled threshold adaptive memristor model with power-law window
//! functions.
//!
//! ## Model Dynamics
//!
//! ```text
//! voltage ≥ v_off:
//!     x += dt · k_off · (voltage / v_off − 1)^alpha_off · (1 − x)^P_off
//!
//! voltage ≤ v_on:
//!     x += dt · k_on · (voltage / v_on − 1)^alpha_on · x^P_on
//!
//! v_on < voltage < v_off:
//!     no change
//!
//! x is clamped to [0, 1] afterwards.
//! ```
//!
//! At exactly `voltage = v_off` the drift term is `0^alpha_off = 0`, so the state is
//! left unchanged for any positive `alpha_off`.

use super::traits::{DriftModel, ModelParameters, WindowExponents};

/// VTEAM drift model
#[derive(Debug, Clone, Copy, Default)]
pub struct VteamModel;

impl VteamModel {
    pub fn new() -> Self {
        Self
    }
}

impl DriftModel for VteamModel {
    type Parameters = VteamParameters;

    fn model_name(&self) -> &'static str {
        "VTEAM"
    }

    #[inline(always)]
    fn step(
        &self,
        x: f64,
        voltage: f64,
        window: WindowExponents,
        params: &VteamParameters,
    ) -> f64 {
        let dx = if voltage >= params.v_off {
            params.delta_t
                * params.k_off
                * (voltage / params.v_off - 1.0).powf(params.alpha_off)
                * (1.0 - x).powf(window.p_off)
        } else if voltage <= params.v_on {
            params.delta_t
                * params.k_on
                * (voltage / params.v_on - 1.0).powf(params.alpha_on)
                * x.powf(window.p_on)
        } else {
            0.0
        };
        (x + dx).clamp(0.0, 1.0)
    }
}

/// Drift constants read by [`VteamModel`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VteamParameters {
    pub delta_t: f64,
    pub k_on: f64,
    pub k_off: f64,
    pub v_on: f64,
    pub v_off: f64,
    pub alpha_on: f64,
    pub alpha_off: f64,
}

impl ModelParameters for VteamParameters {
    fn validate(&self) -> Result<(), &'static str> {
        if self.delta_t <= 0.0 {
            return Err("VTEAM: delta_t must be positive");
        }
        if !(self.v_on < 0.0 && self.v_off > 0.0) {
            return Err("VTEAM: thresholds must satisfy v_on < 0 < v_off");
        }
        Ok(())
    }

    fn parameter_count() -> usize {
        7
    }
}
