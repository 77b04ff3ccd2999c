// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Retention Loss
//!
//! Decay of the programmed conductance, evaluated in the conductance domain and
//! re-normalized back into the drift state.
//!
//! ```text
//! G = G_off·x + G_on·(1 − x)
//!
//! pulsed:  G ← G · exp(−(¼ · dt · tau)^beta)
//! idle:    idle ← (v_on < v < v_off) ? idle + dt : 0
//!          G ← G − G · dt · tau^beta · beta · idle^(beta − 1)
//!
//! G ← clamp(G, min(G_on, G_off), max(G_on, G_off))
//! x = (G − G_on) / (G_off − G_on)
//! ```

use memsim_crossbar_device::DeviceProfile;
use ndarray::{Array3, ArrayView3, Zip};

use crate::options::RetentionLoss;

/// Retention loss state
#[derive(Debug, Clone, PartialEq)]
pub enum RetentionModel {
    Pulsed,
    Idle {
        /// Time each device has spent between thresholds, `[batch, rows, cols]`
        idle_time: Array3<f64>,
    },
}

impl RetentionModel {
    /// `None` when retention loss is disabled
    pub fn new(mode: RetentionLoss, dims: (usize, usize, usize)) -> Option<Self> {
        match mode {
            RetentionLoss::None => None,
            RetentionLoss::Pulsed => Some(RetentionModel::Pulsed),
            RetentionLoss::Idle => Some(RetentionModel::Idle {
                idle_time: Array3::zeros(dims),
            }),
        }
    }

    /// Decay `x` in place after a write of `voltage`
    pub fn apply(&mut self, x: &mut Array3<f64>, voltage: &ArrayView3<f64>, profile: &DeviceProfile) {
        let dt = profile.delta_t;
        let tau = profile.retention_loss_tau;
        let beta = profile.retention_loss_beta;
        match self {
            RetentionModel::Pulsed => {
                let factor = (-(0.25 * dt * tau).powf(beta)).exp();
                x.mapv_inplace(|value| settle(profile, profile.conductance_at(value) * factor));
            }
            RetentionModel::Idle { idle_time } => {
                let rate = dt * tau.powf(beta) * beta;
                Zip::from(x)
                    .and(idle_time)
                    .and(voltage)
                    .for_each(|value, idle, &v| {
                        if profile.is_idle(v) {
                            *idle += dt;
                        } else {
                            *idle = 0.0;
                        }
                        let g = profile.conductance_at(*value);
                        let mut decay = g * rate * idle.powf(beta - 1.0);
                        // Zero idle time with beta < 1: no decay, rather than collapsing to G_on
                        if !decay.is_finite() {
                            decay = 0.0;
                        }
                        *value = settle(profile, g - decay);
                    });
            }
        }
    }

    /// Idle counters, when the idle model is active
    pub fn idle_time(&self) -> Option<&Array3<f64>> {
        match self {
            RetentionModel::Idle { idle_time } => Some(idle_time),
            RetentionModel::Pulsed => None,
        }
    }
}

/// Clamp to the nominal conductance range and return to the state domain
#[inline]
fn settle(profile: &DeviceProfile, g: f64) -> f64 {
    profile.normalize(g.max(profile.g_min()).min(profile.g_max()))
}
