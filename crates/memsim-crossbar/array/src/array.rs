// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Memristor Array
//!
//! Batched state engine composing drift physics with every enabled non-ideality.
//!
//! ## Write Pipeline
//!
//! ```text
//! 1. drift         x ← VTEAM(x, v)              (d2d window exponents if enabled)
//! 2. retention     x ← decay(x)                 (pulsed | idle)
//! 3. c2c noise     x2 ← x + x·N(0,σr) + N(0,σa) (fresh draw, clamped)
//! 4. stuck-at      x2 ← 0 on SAF0, 1 on SAF1
//! 5. materialize   G = G_off_eff·x2 + G_on_eff·(1 − x2)
//!                  G_eff: aging > d2d conductance > profile
//! ```
//!
//! `x` is the persisted drift state. c2c noise and stuck-at overrides shape the
//! observed state `x2` that feeds the conductance, and never feed back into `x`.

use std::sync::Arc;

use memsim_crossbar_device::{
    ArrayShape, DeviceCoordinate, DeviceProfile, DriftModel, MemsimError, Result, VteamModel,
    VteamParameters, WindowExponents,
};
use ndarray::{Array3, ArrayView3, Zip};
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use crate::aging::AgingModel;
use crate::fault::FaultModel;
use crate::options::NonIdealities;
use crate::retention::RetentionModel;
use crate::rng::seeded_rng;
use crate::state::ConductanceState;
use crate::variation::VariationModel;

/// Everything that is (re)drawn when the array is configured
struct Allocation {
    state: ConductanceState,
    observed: Array3<f64>,
    conductance: Array3<f64>,
    variation: VariationModel,
    faults: Option<FaultModel>,
    aging: Option<AgingModel>,
    retention: Option<RetentionModel>,
}

/// Batched array of memristors sharing one device profile
///
/// One instance owns its state exclusively. `write` and `update_fault_mask` take
/// `&mut self`; shard across instances for parallelism.
#[derive(Debug)]
pub struct MemristorArray {
    profile: Arc<DeviceProfile>,
    options: NonIdealities,
    shape: ArrayShape,
    batch_size: usize,
    drift: VteamModel,
    drift_params: VteamParameters,
    rng: StdRng,
    state: ConductanceState,
    /// State after c2c noise and stuck-at overrides
    observed: Array3<f64>,
    /// Current programmed conductance
    conductance: Array3<f64>,
    variation: VariationModel,
    faults: Option<FaultModel>,
    aging: Option<AgingModel>,
    retention: Option<RetentionModel>,
}

impl MemristorArray {
    /// Allocate state and draw every enabled variation and fault mask.
    ///
    /// All devices start off (`x = 0`) at `t = 0`. `seed` makes every stochastic
    /// draw reproducible; `None` seeds from OS entropy.
    pub fn configure(
        batch_size: usize,
        shape: ArrayShape,
        profile: Arc<DeviceProfile>,
        options: NonIdealities,
        seed: Option<u64>,
    ) -> Result<Self> {
        profile.validate()?;
        let mut rng = seeded_rng(seed);
        let allocation = Self::allocate(&profile, &options, shape, batch_size, &mut rng)?;

        info!(
            batch_size,
            shape = %shape,
            options = %options,
            seeded = seed.is_some(),
            "Configured memristor array"
        );

        Ok(Self {
            drift: VteamModel::new(),
            drift_params: profile.vteam_parameters(),
            profile,
            options,
            shape,
            batch_size,
            rng,
            state: allocation.state,
            observed: allocation.observed,
            conductance: allocation.conductance,
            variation: allocation.variation,
            faults: allocation.faults,
            aging: allocation.aging,
            retention: allocation.retention,
        })
    }

    /// Re-create all state for a new batch size.
    ///
    /// Variation draws and fault masks are discarded and drawn again from the
    /// array's generator; every device returns to `x = 0`, `t = 0`.
    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        let allocation = Self::allocate(
            &self.profile,
            &self.options,
            self.shape,
            batch_size,
            &mut self.rng,
        )?;
        self.batch_size = batch_size;
        self.state = allocation.state;
        self.observed = allocation.observed;
        self.conductance = allocation.conductance;
        self.variation = allocation.variation;
        self.faults = allocation.faults;
        self.aging = allocation.aging;
        self.retention = allocation.retention;
        info!(batch_size, shape = %self.shape, "Reconfigured memristor array");
        Ok(())
    }

    fn allocate(
        profile: &DeviceProfile,
        options: &NonIdealities,
        shape: ArrayShape,
        batch_size: usize,
        rng: &mut StdRng,
    ) -> Result<Allocation> {
        if batch_size == 0 {
            return Err(MemsimError::Configuration(
                "batch size must be positive".to_string(),
            ));
        }
        let dims = (batch_size, shape.rows, shape.cols);

        let variation = VariationModel::draw(profile, options, shape, rng)?;
        let faults = options
            .stuck_at_fault
            .then(|| FaultModel::draw(profile, shape, rng));
        let aging = AgingModel::new(options.aging_effect, profile, variation.conductance(), dims);
        let retention = RetentionModel::new(options.retention_loss, dims);

        let state = ConductanceState::new(batch_size, shape.rows, shape.cols);
        let mut allocation = Allocation {
            observed: state.x.clone(),
            conductance: Array3::zeros(dims),
            state,
            variation,
            faults,
            aging,
            retention,
        };
        if let Some(faults) = &allocation.faults {
            faults.apply(&mut allocation.observed);
        }
        materialize(
            profile,
            &allocation.observed,
            &allocation.variation,
            allocation.aging.as_ref(),
            &mut allocation.conductance,
        );
        Ok(allocation)
    }

    /// Advance every device by one simulation step.
    ///
    /// `voltage` and `elapsed` must broadcast to `[batch, rows, cols]` (a leading
    /// batch dimension of 1 is shared by all batch elements). Elapsed time must be
    /// non-negative and must not run backwards. Inputs are fully validated before
    /// any state changes. Returns the new programmed conductance.
    pub fn write(
        &mut self,
        voltage: ArrayView3<f64>,
        elapsed: ArrayView3<f64>,
    ) -> Result<&Array3<f64>> {
        let dims = self.state.dim();
        let (batch, rows, cols) = dims;
        let expected = [batch, rows, cols];

        let v = voltage
            .broadcast(dims)
            .ok_or_else(|| MemsimError::shape_mismatch("write voltage", &expected, voltage.shape()))?;
        let t = elapsed
            .broadcast(dims)
            .ok_or_else(|| MemsimError::shape_mismatch("elapsed time", &expected, elapsed.shape()))?;

        if let Some(bad) = v.iter().find(|value| !value.is_finite()) {
            return Err(MemsimError::Range(format!(
                "write voltage must be finite, got {}",
                bad
            )));
        }
        for (&new, &old) in t.iter().zip(self.state.t.iter()) {
            if !new.is_finite() || new < 0.0 {
                return Err(MemsimError::Range(format!(
                    "elapsed time must be finite and non-negative, got {}",
                    new
                )));
            }
            if new < old {
                return Err(MemsimError::Range(format!(
                    "elapsed time must not decrease ({} after {})",
                    new, old
                )));
            }
        }

        // 1. drift
        let model = self.drift;
        let params = self.drift_params;
        match self.variation.exponents() {
            Some(exponents) => {
                Zip::from(&mut self.state.x)
                    .and(&v)
                    .and_broadcast(&exponents.p_on)
                    .and_broadcast(&exponents.p_off)
                    .for_each(|x, &voltage, &p_on, &p_off| {
                        *x = model.step(*x, voltage, WindowExponents::new(p_on, p_off), &params);
                    });
            }
            None => {
                let window = WindowExponents::new(self.profile.p_on, self.profile.p_off);
                Zip::from(&mut self.state.x)
                    .and(&v)
                    .for_each(|x, &voltage| *x = model.step(*x, voltage, window, &params));
            }
        }
        self.state.t.assign(&t);

        // 2. retention
        if let Some(retention) = self.retention.as_mut() {
            retention.apply(&mut self.state.x, &v, &self.profile);
        }

        // 3. c2c noise on the observed state
        self.observed.assign(&self.state.x);
        self.variation
            .apply_cycle_noise(&mut self.observed, &mut self.rng);

        // 4. stuck-at faults
        if let Some(faults) = &self.faults {
            faults.apply(&mut self.observed);
        }

        // 5. aging + materialization
        if let Some(aging) = self.aging.as_mut() {
            aging.update(&self.state.t, self.profile.aging_k_on, self.profile.aging_k_off);
        }
        materialize(
            &self.profile,
            &self.observed,
            &self.variation,
            self.aging.as_ref(),
            &mut self.conductance,
        );

        trace!(
            batch,
            rows,
            cols,
            max_elapsed = self.state.max_elapsed(),
            "Array write"
        );
        Ok(&self.conductance)
    }

    /// [`write`](Self::write) with one elapsed time shared by every device
    pub fn write_at(&mut self, voltage: ArrayView3<f64>, elapsed: f64) -> Result<&Array3<f64>> {
        let elapsed = Array3::from_elem((1, 1, 1), elapsed);
        self.write(voltage, elapsed.view())
    }

    /// Batched vector–matrix read: `[batch, 1, rows] · [batch, rows, cols] → [batch, 1, cols]`.
    ///
    /// Every voltage must lie inside `[v_on, v_off]`. Device state is never touched.
    pub fn read(&self, voltage: ArrayView3<f64>) -> Result<Array3<f64>> {
        let (batch, rows, cols) = self.state.dim();
        let v = voltage.broadcast((batch, 1, rows)).ok_or_else(|| {
            MemsimError::shape_mismatch("read voltage", &[batch, 1, rows], voltage.shape())
        })?;

        if let Some(((b, i, j), &bad)) = v
            .indexed_iter()
            .find(|(_, value)| !self.profile.is_read_safe(**value))
        {
            return Err(MemsimError::ReadVoltageOutOfRange {
                voltage: bad,
                index: vec![b, i, j],
                v_on: self.profile.v_on,
                v_off: self.profile.v_off,
            });
        }

        let mut output = Array3::zeros((batch, 1, cols));
        for ((mut out, v_b), g_b) in output
            .outer_iter_mut()
            .zip(v.outer_iter())
            .zip(self.conductance.outer_iter())
        {
            out.assign(&v_b.dot(&g_b));
        }
        trace!(batch, rows, cols, "Array read");
        Ok(output)
    }

    /// Grow the stuck-at-fault population toward its time-dependent target.
    ///
    /// Returns the number of newly faulted devices (0 when stuck-at faults are
    /// disabled or the target is already met). Newly faulted devices are pinned in
    /// the current conductance immediately.
    pub fn update_fault_mask(&mut self) -> usize {
        let max_elapsed = self.state.max_elapsed();
        let added = match self.faults.as_mut() {
            Some(faults) => faults.grow(&self.profile, max_elapsed, &mut self.rng),
            None => {
                debug!("Stuck-at faults disabled; fault mask unchanged");
                return 0;
            }
        };
        if added > 0 {
            if let Some(faults) = &self.faults {
                faults.apply(&mut self.observed);
            }
            materialize(
                &self.profile,
                &self.observed,
                &self.variation,
                self.aging.as_ref(),
                &mut self.conductance,
            );
        }
        added
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn options(&self) -> &NonIdealities {
        &self.options
    }

    pub fn shape(&self) -> ArrayShape {
        self.shape
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Persisted drift state and elapsed time
    pub fn state(&self) -> &ConductanceState {
        &self.state
    }

    /// State after c2c noise and stuck-at overrides
    pub fn observed_state(&self) -> &Array3<f64> {
        &self.observed
    }

    /// Current programmed conductance, `[batch, rows, cols]`
    pub fn conductance(&self) -> &Array3<f64> {
        &self.conductance
    }

    pub fn variation(&self) -> &VariationModel {
        &self.variation
    }

    pub fn faults(&self) -> Option<&FaultModel> {
        self.faults.as_ref()
    }

    pub fn aging(&self) -> Option<&AgingModel> {
        self.aging.as_ref()
    }

    pub fn retention(&self) -> Option<&RetentionModel> {
        self.retention.as_ref()
    }

    /// Fraction of stuck devices (0 when stuck-at faults are disabled)
    pub fn faulted_ratio(&self) -> f64 {
        self.faults.as_ref().map_or(0.0, FaultModel::faulted_ratio)
    }

    /// Effective `(G_on, G_off)` per device, `[batch, rows, cols]`
    pub fn effective_bounds(&self) -> (Array3<f64>, Array3<f64>) {
        let dims = self.state.dim();
        if let Some(aging) = &self.aging {
            (aging.g_on().clone(), aging.g_off().clone())
        } else if let Some(bounds) = self.variation.conductance() {
            (
                Array3::from_shape_fn(dims, |(_, r, c)| bounds.g_on[[r, c]]),
                Array3::from_shape_fn(dims, |(_, r, c)| bounds.g_off[[r, c]]),
            )
        } else {
            (
                Array3::from_elem(dims, self.profile.g_on),
                Array3::from_elem(dims, self.profile.g_off),
            )
        }
    }

    /// `(row, col)` of the device at a row-major index
    pub fn coordinate(&self, index: usize) -> Result<DeviceCoordinate> {
        self.shape.coordinate(index)
    }
}

/// Stage 5: `G = G_off_eff·x2 + G_on_eff·(1 − x2)`
fn materialize(
    profile: &DeviceProfile,
    observed: &Array3<f64>,
    variation: &VariationModel,
    aging: Option<&AgingModel>,
    conductance: &mut Array3<f64>,
) {
    if let Some(aging) = aging {
        Zip::from(conductance)
            .and(observed)
            .and(aging.g_on())
            .and(aging.g_off())
            .for_each(|g, &x, &on, &off| *g = off * x + on * (1.0 - x));
    } else if let Some(bounds) = variation.conductance() {
        Zip::from(conductance)
            .and(observed)
            .and_broadcast(&bounds.g_on)
            .and_broadcast(&bounds.g_off)
            .for_each(|g, &x, &on, &off| *g = off * x + on * (1.0 - x));
    } else {
        Zip::from(conductance)
            .and(observed)
            .for_each(|g, &x| *g = profile.conductance_at(x));
    }
}
