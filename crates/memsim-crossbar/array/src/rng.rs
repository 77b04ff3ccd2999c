// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seeded randomness for variation and fault draws

use memsim_crossbar_device::{MemsimError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Normal;

/// Generator seeded from `seed`, or from OS entropy when absent
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => StdRng::from_entropy(),
    }
}

/// Normal distribution, rejecting negative or non-finite spreads as a range error
pub(crate) fn normal(mean: f64, sigma: f64, what: &str) -> Result<Normal<f64>> {
    if !mean.is_finite() || !sigma.is_finite() {
        return Err(MemsimError::Range(format!(
            "{}: mean and sigma must be finite (mean={}, sigma={})",
            what, mean, sigma
        )));
    }
    Normal::new(mean, sigma)
        .map_err(|e| MemsimError::Range(format!("{}: {} (sigma={})", what, e, sigma)))
}
