// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Device-to-Device and Cycle-to-Cycle Variation
//!
//! ```text
//! d2d (drawn once per (row, col) at configuration, broadcast over batch):
//!     Gon_d2d  ~ max(N(G_on,  Gon_sigma),  0)
//!     Goff_d2d ~ max(N(G_off, Goff_sigma), 0)
//!     Pon_d2d  ~ max(N(P_on,  Pon_sigma),  0)
//!     Poff_d2d ~ max(N(P_off, Poff_sigma), 0)
//!
//! c2c (drawn fresh on every write):
//!     x ← clamp(x + x·N(0, sigma_relative) + N(0, sigma_absolute), 0, 1)
//! ```

use memsim_crossbar_device::{ArrayShape, DeviceProfile, Result};
use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::options::NonIdealities;
use crate::rng::normal;

/// Per-device conductance bounds
#[derive(Debug, Clone, PartialEq)]
pub struct ConductanceVariation {
    pub g_on: Array2<f64>,
    pub g_off: Array2<f64>,
}

/// Per-device window exponents
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentVariation {
    pub p_on: Array2<f64>,
    pub p_off: Array2<f64>,
}

#[derive(Debug, Clone, Copy)]
struct CycleNoise {
    relative: Normal<f64>,
    absolute: Normal<f64>,
}

/// Persisted d2d draws plus the c2c noise source
#[derive(Debug, Clone, Default)]
pub struct VariationModel {
    conductance: Option<ConductanceVariation>,
    exponents: Option<ExponentVariation>,
    cycle_noise: Option<CycleNoise>,
}

impl VariationModel {
    /// Draw the d2d overrides enabled in `options`.
    ///
    /// All distributions are validated before anything is drawn.
    pub fn draw(
        profile: &DeviceProfile,
        options: &NonIdealities,
        shape: ArrayShape,
        rng: &mut StdRng,
    ) -> Result<Self> {
        let d2d = options.d2d_variation;
        let conductance_dists = if d2d.varies_conductance() {
            Some((
                normal(profile.g_on, profile.gon_sigma, "Gon_d2d")?,
                normal(profile.g_off, profile.goff_sigma, "Goff_d2d")?,
            ))
        } else {
            None
        };
        let exponent_dists = if d2d.varies_exponents() {
            Some((
                normal(profile.p_on, profile.pon_sigma, "Pon_d2d")?,
                normal(profile.p_off, profile.poff_sigma, "Poff_d2d")?,
            ))
        } else {
            None
        };
        let cycle_noise = if options.c2c_variation {
            Some(CycleNoise {
                relative: normal(0.0, profile.sigma_relative, "sigma_relative")?,
                absolute: normal(0.0, profile.sigma_absolute, "sigma_absolute")?,
            })
        } else {
            None
        };

        let dims = shape.as_tuple();
        let conductance = conductance_dists.map(|(on, off)| ConductanceVariation {
            g_on: draw_non_negative(dims, &on, rng),
            g_off: draw_non_negative(dims, &off, rng),
        });
        let exponents = exponent_dists.map(|(on, off)| ExponentVariation {
            p_on: draw_non_negative(dims, &on, rng),
            p_off: draw_non_negative(dims, &off, rng),
        });

        debug!(
            shape = %shape,
            conductance = conductance.is_some(),
            exponents = exponents.is_some(),
            c2c = cycle_noise.is_some(),
            "Drew device variation"
        );

        Ok(Self {
            conductance,
            exponents,
            cycle_noise,
        })
    }

    pub fn conductance(&self) -> Option<&ConductanceVariation> {
        self.conductance.as_ref()
    }

    pub fn exponents(&self) -> Option<&ExponentVariation> {
        self.exponents.as_ref()
    }

    pub fn has_cycle_noise(&self) -> bool {
        self.cycle_noise.is_some()
    }

    /// Perturb `x` with fresh c2c noise; no-op when c2c is disabled
    pub fn apply_cycle_noise(&self, x: &mut Array3<f64>, rng: &mut StdRng) {
        let Some(noise) = self.cycle_noise else {
            return;
        };
        x.mapv_inplace(|value| {
            let relative = noise.relative.sample(rng);
            let absolute = noise.absolute.sample(rng);
            (value + value * relative + absolute).clamp(0.0, 1.0)
        });
    }
}

fn draw_non_negative(dims: (usize, usize), dist: &Normal<f64>, rng: &mut StdRng) -> Array2<f64> {
    Array2::from_shape_simple_fn(dims, || dist.sample(rng).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::D2dVariation;
    use crate::rng::seeded_rng;
    use memsim_crossbar_device::MemsimError;

    fn shape() -> ArrayShape {
        ArrayShape::new(16, 16).unwrap()
    }

    #[test]
    fn test_disabled_draws_nothing() {
        let profile = DeviceProfile::ideal(1e-4, 1e-3);
        let mut rng = seeded_rng(Some(1));
        let model =
            VariationModel::draw(&profile, &NonIdealities::ideal(), shape(), &mut rng).unwrap();
        assert!(model.conductance().is_none());
        assert!(model.exponents().is_none());
        assert!(!model.has_cycle_noise());
    }

    #[test]
    fn test_draws_follow_mode() {
        let profile = DeviceProfile::ideal(1e-4, 1e-3).with_d2d_percentage(0.1).unwrap();
        let mut rng = seeded_rng(Some(1));
        let options = NonIdealities {
            d2d_variation: D2dVariation::ConductanceOnly,
            ..NonIdealities::ideal()
        };
        let model = VariationModel::draw(&profile, &options, shape(), &mut rng).unwrap();
        let bounds = model.conductance().unwrap();
        assert_eq!(bounds.g_on.dim(), (16, 16));
        assert!(model.exponents().is_none());
        // Draws spread around the nominal value
        assert!(bounds.g_off.iter().any(|&g| g != 1e-3));
        let mean = bounds.g_off.mean().unwrap();
        assert!((mean - 1e-3).abs() < 5e-5);
    }

    #[test]
    fn test_draws_clamped_non_negative() {
        let mut profile = DeviceProfile::ideal(1e-4, 1e-3);
        profile.p_on = 0.1;
        profile.pon_sigma = 5.0;
        profile.poff_sigma = 5.0;
        let mut rng = seeded_rng(Some(3));
        let options = NonIdealities {
            d2d_variation: D2dVariation::ExponentOnly,
            ..NonIdealities::ideal()
        };
        let model = VariationModel::draw(&profile, &options, shape(), &mut rng).unwrap();
        let exps = model.exponents().unwrap();
        assert!(exps.p_on.iter().all(|&p| p >= 0.0));
        assert!(exps.p_on.iter().any(|&p| p == 0.0));
    }

    #[test]
    fn test_cycle_noise_keeps_state_in_unit_interval() {
        let mut profile = DeviceProfile::ideal(1e-4, 1e-3);
        profile.sigma_relative = 0.5;
        profile.sigma_absolute = 0.5;
        let mut rng = seeded_rng(Some(9));
        let options = NonIdealities {
            c2c_variation: true,
            ..NonIdealities::ideal()
        };
        let model = VariationModel::draw(&profile, &options, shape(), &mut rng).unwrap();
        let mut x = Array3::from_elem((2, 16, 16), 0.5);
        model.apply_cycle_noise(&mut x, &mut rng);
        assert!(x.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(x.iter().any(|&v| v != 0.5));
    }

    #[test]
    fn test_non_finite_sigma_is_range_error() {
        let mut profile = DeviceProfile::ideal(1e-4, 1e-3);
        profile.gon_sigma = f64::INFINITY;
        let mut rng = seeded_rng(Some(1));
        let options = NonIdealities {
            d2d_variation: D2dVariation::Both,
            ..NonIdealities::ideal()
        };
        assert!(matches!(
            VariationModel::draw(&profile, &options, shape(), &mut rng),
            Err(MemsimError::Range(_))
        ));
    }
}
