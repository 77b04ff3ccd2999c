// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Device Profile
//!
//! Immutable physical constants for one device technology. A profile is loaded
//! once (usually from the device library file) and shared read-only by every array
//! built from it.
//!
//! ## Conductance Domain
//!
//! ```text
//! G(x) = G_off·x + G_on·(1 − x)        x ∈ [0, 1]
//! x(G) = (G − G_on) / (G_off − G_on)
//! ```
//!
//! `x = 0` is the initial (off) state and reads as `G_on`.

use serde::{Deserialize, Serialize};

use crate::error::{MemsimError, Result};
use crate::models::VteamParameters;

/// Physical constants of one memristor technology
///
/// Field names on disk follow the device parameter file (`G_on`, `Pon_sigma`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Simulation time step (s)
    pub delta_t: f64,
    /// Drift rate below `v_on` (negative: drives the state down)
    pub k_on: f64,
    /// Drift rate above `v_off`
    pub k_off: f64,
    /// Negative threshold voltage (V)
    pub v_on: f64,
    /// Positive threshold voltage (V)
    pub v_off: f64,
    pub alpha_on: f64,
    pub alpha_off: f64,
    /// Window exponent applied as `x^P_on`
    #[serde(rename = "P_on")]
    pub p_on: f64,
    /// Window exponent applied as `(1 − x)^P_off`
    #[serde(rename = "P_off")]
    pub p_off: f64,
    /// Conductance at `x = 0` (S)
    #[serde(rename = "G_on")]
    pub g_on: f64,
    /// Conductance at `x = 1` (S)
    #[serde(rename = "G_off")]
    pub g_off: f64,

    // Cycle-to-cycle noise
    pub sigma_relative: f64,
    pub sigma_absolute: f64,

    // Device-to-device spreads
    #[serde(rename = "Gon_sigma")]
    pub gon_sigma: f64,
    #[serde(rename = "Goff_sigma")]
    pub goff_sigma: f64,
    #[serde(rename = "Pon_sigma")]
    pub pon_sigma: f64,
    #[serde(rename = "Poff_sigma")]
    pub poff_sigma: f64,

    // Retention loss
    pub retention_loss_tau: f64,
    pub retention_loss_beta: f64,

    // Aging
    #[serde(rename = "Aging_k_on")]
    pub aging_k_on: f64,
    #[serde(rename = "Aging_k_off")]
    pub aging_k_off: f64,

    // Stuck-at faults
    #[serde(rename = "SAF_lambda")]
    pub saf_lambda: f64,
    #[serde(rename = "SAF_ratio")]
    pub saf_ratio: f64,
    #[serde(rename = "SAF_delta")]
    pub saf_delta: f64,
}

impl DeviceProfile {
    /// Noise-free linear device: one unit of state per volt above `v_off` per step.
    ///
    /// `dt = 1`, `k_off = 1`, `k_on = −1`, thresholds at ±1 V, `alpha = 1`, `P = 0`
    /// and every variation, retention, aging and fault constant zero. Writing
    /// `v = 1 + Δx` from the off state moves the state by exactly `Δx`.
    pub fn ideal(g_on: f64, g_off: f64) -> Self {
        Self {
            delta_t: 1.0,
            k_on: -1.0,
            k_off: 1.0,
            v_on: -1.0,
            v_off: 1.0,
            alpha_on: 1.0,
            alpha_off: 1.0,
            p_on: 0.0,
            p_off: 0.0,
            g_on,
            g_off,
            sigma_relative: 0.0,
            sigma_absolute: 0.0,
            gon_sigma: 0.0,
            goff_sigma: 0.0,
            pon_sigma: 0.0,
            poff_sigma: 0.0,
            retention_loss_tau: 0.0,
            retention_loss_beta: 1.0,
            aging_k_on: 0.0,
            aging_k_off: 0.0,
            saf_lambda: 0.0,
            saf_ratio: 0.0,
            saf_delta: 0.0,
        }
    }

    /// Check the physical invariants of the profile
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("delta_t", self.delta_t),
            ("k_on", self.k_on),
            ("k_off", self.k_off),
            ("v_on", self.v_on),
            ("v_off", self.v_off),
            ("alpha_on", self.alpha_on),
            ("alpha_off", self.alpha_off),
            ("P_on", self.p_on),
            ("P_off", self.p_off),
            ("G_on", self.g_on),
            ("G_off", self.g_off),
            ("sigma_relative", self.sigma_relative),
            ("sigma_absolute", self.sigma_absolute),
            ("Gon_sigma", self.gon_sigma),
            ("Goff_sigma", self.goff_sigma),
            ("Pon_sigma", self.pon_sigma),
            ("Poff_sigma", self.poff_sigma),
            ("retention_loss_tau", self.retention_loss_tau),
            ("retention_loss_beta", self.retention_loss_beta),
            ("Aging_k_on", self.aging_k_on),
            ("Aging_k_off", self.aging_k_off),
            ("SAF_lambda", self.saf_lambda),
            ("SAF_ratio", self.saf_ratio),
            ("SAF_delta", self.saf_delta),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MemsimError::Configuration(format!(
                "profile field {} must be finite, got {}",
                name, value
            )));
        }

        if self.delta_t <= 0.0 {
            return Err(MemsimError::Configuration(
                "delta_t must be positive".to_string(),
            ));
        }
        if !(self.v_on < 0.0 && 0.0 < self.v_off) {
            return Err(MemsimError::Configuration(format!(
                "thresholds must satisfy v_on < 0 < v_off, got v_on={} v_off={}",
                self.v_on, self.v_off
            )));
        }
        if self.p_on < 0.0 || self.p_off < 0.0 {
            return Err(MemsimError::Configuration(
                "window exponents P_on and P_off must be non-negative".to_string(),
            ));
        }
        if self.g_on <= 0.0 || self.g_off <= 0.0 {
            return Err(MemsimError::Configuration(
                "conductances G_on and G_off must be strictly positive".to_string(),
            ));
        }
        if self.g_on == self.g_off {
            return Err(MemsimError::Configuration(
                "G_on and G_off must differ".to_string(),
            ));
        }

        for (name, value) in &fields[11..17] {
            if *value < 0.0 {
                return Err(MemsimError::Configuration(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.retention_loss_tau < 0.0 || self.retention_loss_beta < 0.0 {
            return Err(MemsimError::Configuration(
                "retention constants must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.saf_lambda) {
            return Err(MemsimError::Configuration(format!(
                "SAF_lambda must be in [0, 1], got {}",
                self.saf_lambda
            )));
        }
        if self.saf_ratio < 0.0 || self.saf_delta < 0.0 {
            return Err(MemsimError::Configuration(
                "SAF_ratio and SAF_delta must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace the d2d spreads with a fraction `p` of each nominal value.
    ///
    /// `p` must lie in `[0, 1)`.
    pub fn with_d2d_percentage(mut self, p: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&p) {
            return Err(MemsimError::Range(format!(
                "d2d variation percentage must be in [0, 1), got {}",
                p
            )));
        }
        self.gon_sigma = p * self.g_on;
        self.goff_sigma = p * self.g_off;
        self.pon_sigma = p * self.p_on;
        self.poff_sigma = p * self.p_off;
        Ok(self)
    }

    /// Conductance for a normalized state
    #[inline]
    pub fn conductance_at(&self, x: f64) -> f64 {
        self.g_off * x + self.g_on * (1.0 - x)
    }

    /// Normalized state for a conductance (inverse of [`conductance_at`](Self::conductance_at))
    #[inline]
    pub fn normalize(&self, g: f64) -> f64 {
        (g - self.g_on) / (self.g_off - self.g_on)
    }

    /// `G_off − G_on`
    #[inline]
    pub fn conductance_span(&self) -> f64 {
        self.g_off - self.g_on
    }

    /// Smaller of the two nominal conductances
    pub fn g_min(&self) -> f64 {
        self.g_on.min(self.g_off)
    }

    /// Larger of the two nominal conductances
    pub fn g_max(&self) -> f64 {
        self.g_on.max(self.g_off)
    }

    /// Whether `voltage` lies inside the read window `[v_on, v_off]`
    #[inline]
    pub fn is_read_safe(&self, voltage: f64) -> bool {
        voltage >= self.v_on && voltage <= self.v_off
    }

    /// Whether `voltage` lies strictly between the thresholds (no drift)
    #[inline]
    pub fn is_idle(&self, voltage: f64) -> bool {
        voltage > self.v_on && voltage < self.v_off
    }

    /// Drift constants for the VTEAM model
    pub fn vteam_parameters(&self) -> VteamParameters {
        VteamParameters {
            delta_t: self.delta_t,
            k_on: self.k_on,
            k_off: self.k_off,
            v_on: self.v_on,
            v_off: self.v_off,
            alpha_on: self.alpha_on,
            alpha_off: self.alpha_off,
        }
    }
}
