// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Stuck-at Faults
//!
//! Two mutually exclusive masks over `[rows, cols]`:
//! - **SAF0**: device pinned to `x = 0` (reads as `G_on`)
//! - **SAF1**: device pinned to `x = 1` (reads as `G_off`)
//!
//! ```text
//! Q ~ U[0, 1) per device
//! thr = SAF_ratio / (SAF_ratio + 1) · SAF_lambda
//! SAF0 = Q < thr
//! SAF1 = thr ≤ Q < SAF_lambda
//! ```
//!
//! Masks only ever grow: a faulted device never recovers.

use memsim_crossbar_device::{ArrayShape, DeviceProfile};
use ndarray::{Array2, Array3, Zip};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

/// Persisted stuck-at-fault masks
#[derive(Debug, Clone, PartialEq)]
pub struct FaultModel {
    saf0: Array2<bool>,
    saf1: Array2<bool>,
}

/// Boundary between the SAF0 and SAF1 populations for a fault level
#[inline]
pub fn split_threshold(ratio: f64, level: f64) -> f64 {
    ratio / (ratio + 1.0) * level
}

impl FaultModel {
    /// Draw the initial masks from a uniform field
    pub fn draw(profile: &DeviceProfile, shape: ArrayShape, rng: &mut StdRng) -> Self {
        let lambda = profile.saf_lambda;
        let thr = split_threshold(profile.saf_ratio, lambda);

        let field: Array2<f64> = Array2::from_shape_simple_fn(shape.as_tuple(), || rng.gen());
        let saf0 = field.mapv(|q| q < thr);
        let saf1 = field.mapv(|q| q >= thr && q < lambda);

        let model = Self { saf0, saf1 };
        info!(
            shape = %shape,
            saf0 = model.saf0_count(),
            saf1 = model.saf1_count(),
            "Drew stuck-at-fault masks"
        );
        model
    }

    pub fn saf0(&self) -> &Array2<bool> {
        &self.saf0
    }

    pub fn saf1(&self) -> &Array2<bool> {
        &self.saf1
    }

    pub fn saf0_count(&self) -> usize {
        self.saf0.iter().filter(|&&f| f).count()
    }

    pub fn saf1_count(&self) -> usize {
        self.saf1.iter().filter(|&&f| f).count()
    }

    /// Fraction of devices stuck in either state
    pub fn faulted_ratio(&self) -> f64 {
        (self.saf0_count() + self.saf1_count()) as f64 / self.saf0.len() as f64
    }

    /// Pin faulted devices of every batch element
    pub fn apply(&self, x: &mut Array3<f64>) {
        Zip::from(x)
            .and_broadcast(&self.saf0)
            .and_broadcast(&self.saf1)
            .for_each(|value, &stuck0, &stuck1| {
                if stuck0 {
                    *value = 0.0;
                } else if stuck1 {
                    *value = 1.0;
                }
            });
    }

    /// Grow the fault population toward `SAF_lambda + max_elapsed · SAF_delta`.
    ///
    /// ```text
    /// inc = (target − Q_ratio) / (1 − Q_ratio)
    /// ```
    ///
    /// Only unfaulted devices are eligible, split by the same ratio as the initial
    /// draw. Returns the number of newly faulted devices; nothing changes when
    /// `inc ≤ 0` or `SAF_delta ≤ 0`.
    pub fn grow(&mut self, profile: &DeviceProfile, max_elapsed: f64, rng: &mut StdRng) -> usize {
        let current = self.faulted_ratio();
        if current >= 1.0 {
            debug!("Every device already faulted");
            return 0;
        }
        let target = profile.saf_lambda + max_elapsed * profile.saf_delta;
        let inc = (target - current) / (1.0 - current);
        if !(inc > 0.0 && profile.saf_delta > 0.0) {
            debug!(current, target, "Fault target below current ratio");
            return 0;
        }

        let thr = split_threshold(profile.saf_ratio, inc);
        let mut added = 0;
        Zip::from(&mut self.saf0)
            .and(&mut self.saf1)
            .for_each(|stuck0, stuck1| {
                let q: f64 = rng.gen();
                if *stuck0 || *stuck1 {
                    return;
                }
                if q < thr {
                    *stuck0 = true;
                    added += 1;
                } else if q < inc {
                    *stuck1 = true;
                    added += 1;
                }
            });

        info!(
            added,
            target,
            ratio = self.faulted_ratio(),
            "Grew stuck-at-fault population"
        );
        added
    }
}
