// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Conductance-Bound Aging
//!
//! The effective on/off bounds drift as a pure function of elapsed time:
//!
//! ```text
//! exponential:  G(t) = G0 · (1 − k)^t
//! linear:       G(t) = k · t + G0
//! ```
//!
//! `G0` is the device's d2d conductance draw when conductance variation is enabled,
//! otherwise the profile's nominal value. `k` is `Aging_k_on` for the on bound and
//! `Aging_k_off` for the off bound.

use memsim_crossbar_device::DeviceProfile;
use ndarray::{Array3, Zip};

use crate::options::AgingEffect;
use crate::variation::ConductanceVariation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgingLaw {
    Exponential,
    Linear,
}

impl AgingLaw {
    #[inline]
    fn at(self, g0: f64, k: f64, t: f64) -> f64 {
        match self {
            AgingLaw::Exponential => g0 * (1.0 - k).powf(t),
            AgingLaw::Linear => k * t + g0,
        }
    }
}

/// Aged on/off bounds, `[batch, rows, cols]`
#[derive(Debug, Clone, PartialEq)]
pub struct AgingModel {
    law: AgingLaw,
    g_on_0: Array3<f64>,
    g_off_0: Array3<f64>,
    g_on: Array3<f64>,
    g_off: Array3<f64>,
}

impl AgingModel {
    /// Build the aging state for `effect`; `None` when aging is disabled
    pub fn new(
        effect: AgingEffect,
        profile: &DeviceProfile,
        d2d: Option<&ConductanceVariation>,
        dims: (usize, usize, usize),
    ) -> Option<Self> {
        let law = match effect {
            AgingEffect::None => return None,
            AgingEffect::Exponential => AgingLaw::Exponential,
            AgingEffect::Linear => AgingLaw::Linear,
        };
        let (g_on_0, g_off_0) = match d2d {
            Some(bounds) => (
                Array3::from_shape_fn(dims, |(_, r, c)| bounds.g_on[[r, c]]),
                Array3::from_shape_fn(dims, |(_, r, c)| bounds.g_off[[r, c]]),
            ),
            None => (
                Array3::from_elem(dims, profile.g_on),
                Array3::from_elem(dims, profile.g_off),
            ),
        };
        Some(Self {
            law,
            g_on: g_on_0.clone(),
            g_off: g_off_0.clone(),
            g_on_0,
            g_off_0,
        })
    }

    /// Recompute the bounds for elapsed times `t`
    pub fn update(&mut self, t: &Array3<f64>, k_on: f64, k_off: f64) {
        let law = self.law;
        Zip::from(&mut self.g_on)
            .and(&self.g_on_0)
            .and(t)
            .for_each(|g, &g0, &t| *g = law.at(g0, k_on, t));
        Zip::from(&mut self.g_off)
            .and(&self.g_off_0)
            .and(t)
            .for_each(|g, &g0, &t| *g = law.at(g0, k_off, t));
    }

    pub fn g_on(&self) -> &Array3<f64> {
        &self.g_on
    }

    pub fn g_off(&self) -> &Array3<f64> {
        &self.g_off
    }
}
