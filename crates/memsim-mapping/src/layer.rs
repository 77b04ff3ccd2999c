// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Mapping Layer
//!
//! Owns one [`MemristorArray`] and translates between the value domain and the
//! array's voltage/conductance domain.
//!
//! ## Value ↔ conductance
//!
//! ```text
//! G = x · (G_off − G_on) + G_on          x = (G − G_on) / (G_off − G_on)
//! ```
//!
//! The nominal profile bounds are used in both directions, so variation, aging and
//! faults show up as errors in the value domain.
//!
//! ## Pulse programming
//!
//! ```text
//! reset            v = reset voltage on every device
//! pulse p = 0..N   v = V_lut where p < pulse_count, 0 elsewhere
//! ```

use std::sync::Arc;

use memsim_config::{validate_config, MemsimConfig};
use memsim_crossbar_array::{MemristorArray, NonIdealities};
use memsim_crossbar_device::{
    ArrayShape, DeviceLibrary, DeviceProfile, DeviceRecord, MemsimError, PulseLibrary, PulseTable,
    Result,
};
use ndarray::{Array2, Array3, ArrayD, ArrayView2, ArrayViewD, Axis, IxDyn, Zip};
use tracing::{debug, info, warn};

use crate::clock::StepClock;
use crate::structure::DeviceStructure;

/// Read voltage used by [`MappingLayer::read_values`] unless overridden
pub const DEFAULT_READ_VOLTAGE: f64 = 0.01;

/// Reset drive; far enough below any `v_on` to return every device to the off state
pub const DEFAULT_RESET_VOLTAGE: f64 = -100.0;

/// A device technology picked out of the device and look-up libraries
#[derive(Debug, Clone)]
pub struct DeviceSelection {
    pub name: String,
    pub record: Arc<DeviceRecord>,
    pub lut: Option<PulseTable>,
}

impl DeviceSelection {
    /// Look `name` up in the device library and, if given, the pulse library.
    ///
    /// A pulse library without an entry for `name` yields `lut: None`; whether
    /// that is an error depends on the device structure.
    pub fn from_libraries(
        name: &str,
        devices: &DeviceLibrary,
        luts: Option<&PulseLibrary>,
    ) -> Result<Self> {
        let record = devices.get(name)?;
        let lut = luts.and_then(|library| library.get(name).ok().cloned());
        Ok(Self {
            name: name.to_string(),
            record,
            lut,
        })
    }
}

/// Value-domain front end of a memristor array
#[derive(Debug)]
pub struct MappingLayer {
    structure: DeviceStructure,
    device_name: String,
    record: Arc<DeviceRecord>,
    lut: Option<PulseTable>,
    array: MemristorArray,
    clock: StepClock,
    read_voltage: f64,
}

impl MappingLayer {
    /// Build a layer and configure its array.
    ///
    /// `dims` are the logical dimensions (flattened for `trace`). `mimo` requires a
    /// look-up table and always starts with a batch size of 1.
    pub fn new(
        structure: DeviceStructure,
        device: DeviceSelection,
        options: NonIdealities,
        dims: &[usize],
        batch_size: usize,
        seed: Option<u64>,
    ) -> Result<Self> {
        let shape = structure.array_shape(dims)?;
        if let Some(lut) = &device.lut {
            lut.validate()?;
        }
        if structure.requires_lookup_table() && device.lut.is_none() {
            return Err(MemsimError::LookupUnavailable(format!(
                "no pulse look-up table for device '{}'",
                device.name
            )));
        }

        let batch_size = if structure == DeviceStructure::Mimo && batch_size != 1 {
            warn!(requested = batch_size, "mimo structure starts with batch size 1");
            1
        } else {
            batch_size
        };

        let profile = Arc::new(device.record.profile.clone());
        let delta_t = profile.delta_t;
        let array = MemristorArray::configure(batch_size, shape, profile, options, seed)?;

        info!(
            structure = %structure,
            device = %device.name,
            shape = %shape,
            has_lut = device.lut.is_some(),
            "Created mapping layer"
        );

        Ok(Self {
            structure,
            device_name: device.name,
            record: device.record,
            lut: device.lut,
            array,
            clock: StepClock::new(batch_size, delta_t),
            read_voltage: DEFAULT_READ_VOLTAGE,
        })
    }

    /// Build a layer from a validated run configuration, loading the device and
    /// look-up files it names.
    pub fn from_config(config: &MemsimConfig) -> Result<Self> {
        validate_config(config).map_err(|e| MemsimError::Configuration(e.to_string()))?;
        let structure: DeviceStructure = config.device.device_structure.parse()?;
        let options = options_from_config(config)?;

        let devices = DeviceLibrary::load(&config.data.device_info_path)?;
        let luts = match PulseLibrary::load(&config.data.lut_path) {
            Ok(luts) => Some(luts),
            Err(e) if !structure.requires_lookup_table() => {
                debug!(
                    path = %config.data.lut_path.display(),
                    error = %e,
                    "Pulse look-up table not loaded"
                );
                None
            }
            Err(e) => return Err(e),
        };
        let device =
            DeviceSelection::from_libraries(&config.device.device_name, &devices, luts.as_ref())?;

        Self::new(
            structure,
            device,
            options,
            &[config.array.rows, config.array.cols],
            config.array.batch_size,
            config.array.seed,
        )
    }

    /// Override the read voltage; it must be positive and inside the read window
    pub fn with_read_voltage(mut self, read_voltage: f64) -> Result<Self> {
        if read_voltage <= 0.0 || !self.profile().is_read_safe(read_voltage) {
            return Err(MemsimError::Range(format!(
                "read voltage {} must be positive and within [{}, {}]",
                read_voltage,
                self.profile().v_on,
                self.profile().v_off
            )));
        }
        self.read_voltage = read_voltage;
        Ok(self)
    }

    /// Reconfigure the array for a new batch size; step counters restart at 0
    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        self.array.set_batch_size(batch_size)?;
        self.clock = StepClock::new(batch_size, self.profile().delta_t);
        Ok(())
    }

    /// Set the step counter of every batch element
    pub fn set_steps(&mut self, steps: &[u64]) -> Result<()> {
        self.clock.set_steps(steps)
    }

    /// Rewind the step counter to `step` and drive every device to the off state
    pub fn reset(&mut self, step: u64) -> Result<()> {
        self.clock.rewind(step);
        self.write_reset()?;
        debug!(step, voltage = DEFAULT_RESET_VOLTAGE, "Reset mapping layer");
        Ok(())
    }

    /// Nearest look-up pulse count for each target in `[0, 1]`, shaped `[rows, cols]`
    pub fn map_to_pulse_count(&self, target: ArrayView2<f64>) -> Result<Array2<usize>> {
        let lut = self.lookup_table()?;
        let shape = self.array.shape();
        if target.dim() != shape.as_tuple() {
            return Err(MemsimError::shape_mismatch(
                "target values",
                &[shape.rows, shape.cols],
                target.shape(),
            ));
        }
        if let Some(bad) = target.iter().find(|value| !(0.0..=1.0).contains(*value)) {
            return Err(MemsimError::Range(format!(
                "target value {} outside [0, 1]",
                bad
            )));
        }

        let profile = self.profile();
        Ok(target.mapv(|x| lut.nearest_pulse_count(profile.conductance_at(x))))
    }

    /// Reset, then program each device with its look-up pulse count.
    ///
    /// Targets are validated before the array is touched. Returns the programmed
    /// conductance.
    pub fn program_to(&mut self, target: ArrayView2<f64>) -> Result<&Array3<f64>> {
        let pulse_counts = self.map_to_pulse_count(target)?;
        let (total_no, pulse_voltage) = {
            let lut = self.lookup_table()?;
            (lut.total_no, lut.voltage)
        };

        self.write_reset()?;

        let (rows, cols) = pulse_counts.dim();
        let mut voltage = Array3::zeros((1, rows, cols));
        for pulse in 0..total_no {
            Zip::from(&mut voltage)
                .and_broadcast(&pulse_counts)
                .for_each(|v, &n| *v = if pulse < n { pulse_voltage } else { 0.0 });
            self.write_voltage(&voltage)?;
        }

        debug!(
            pulses = total_no,
            max_count = pulse_counts.iter().copied().max().unwrap_or(0),
            "Programmed array from look-up table"
        );
        Ok(self.array.conductance())
    }

    /// Write binary spikes and return the resulting state in the value domain.
    ///
    /// `spikes` is `[batch, ...]` where the trailing dimensions hold `rows · cols`
    /// values of 0 or 1; the result has the same shape.
    pub fn write_spikes(&mut self, spikes: ArrayViewD<f64>) -> Result<ArrayD<f64>> {
        let (vinput_neg, vinput_pos) = self.record.spike_voltages().ok_or_else(|| {
            MemsimError::Configuration(format!(
                "device '{}' has no spike voltages (vinput_neg/vinput_pos)",
                self.device_name
            ))
        })?;

        let (batch, rows, cols) = self.array.state().dim();
        let per_batch: usize = spikes.shape().iter().skip(1).product();
        if spikes.ndim() < 2 || spikes.shape()[0] != batch || per_batch != rows * cols {
            return Err(MemsimError::shape_mismatch(
                "spikes",
                &[batch, rows, cols],
                spikes.shape(),
            ));
        }

        let mut drive = Vec::with_capacity(spikes.len());
        for &spike in spikes.iter() {
            drive.push(if spike == 1.0 {
                vinput_pos
            } else if spike == 0.0 {
                vinput_neg
            } else {
                return Err(MemsimError::Range(format!(
                    "spike value {} must be 0 or 1",
                    spike
                )));
            });
        }
        let voltage = Array3::from_shape_vec((batch, rows, cols), drive)
            .map_err(|e| MemsimError::Range(e.to_string()))?;

        self.write_voltage(&voltage)?;

        let profile = self.array.profile();
        let values: Vec<f64> = self
            .array
            .conductance()
            .iter()
            .map(|&g| profile.normalize(g))
            .collect();
        ArrayD::from_shape_vec(IxDyn(spikes.shape()), values)
            .map_err(|e| MemsimError::Range(e.to_string()))
    }

    /// Read inputs `[batch, rows]` in `[0, 1]` and return outputs `[batch, cols]`.
    ///
    /// `y_j = (I_j / v_read − G_on · Σ_i u_i) / (G_off − G_on)`; batch elements whose
    /// input is all zero read as 0.
    pub fn read_values(&self, inputs: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (batch, rows, cols) = self.array.state().dim();
        if inputs.dim() != (batch, rows) {
            return Err(MemsimError::shape_mismatch(
                "read inputs",
                &[batch, rows],
                inputs.shape(),
            ));
        }
        if let Some(bad) = inputs.iter().find(|value| !(0.0..=1.0).contains(*value)) {
            return Err(MemsimError::Range(format!(
                "read input {} outside [0, 1]",
                bad
            )));
        }

        let v_read = self.read_voltage;
        let voltage = Array3::from_shape_fn((batch, 1, rows), |(b, _, i)| inputs[[b, i]] * v_read);
        let current = self.array.read(voltage.view())?;

        let profile = self.profile();
        let span = profile.conductance_span();
        let input_sum = inputs.sum_axis(Axis(1));
        Ok(Array2::from_shape_fn((batch, cols), |(b, j)| {
            let sum = input_sum[b];
            if sum == 0.0 {
                0.0
            } else {
                (current[[b, 0, j]] / v_read - profile.g_on * sum) / span
            }
        }))
    }

    /// Grow stuck-at faults; see [`MemristorArray::update_fault_mask`]
    pub fn update_fault_mask(&mut self) -> usize {
        self.array.update_fault_mask()
    }

    /// Write one step at the clock's elapsed time, then advance the clock
    fn write_voltage(&mut self, voltage: &Array3<f64>) -> Result<()> {
        let elapsed = self.clock.elapsed();
        self.array.write(voltage.view(), elapsed.view())?;
        self.clock.advance();
        Ok(())
    }

    fn write_reset(&mut self) -> Result<()> {
        let voltage = Array3::from_elem((1, 1, 1), DEFAULT_RESET_VOLTAGE);
        self.write_voltage(&voltage)
    }

    fn lookup_table(&self) -> Result<&PulseTable> {
        self.lut.as_ref().ok_or_else(|| {
            MemsimError::LookupUnavailable(format!(
                "no pulse look-up table for device '{}'",
                self.device_name
            ))
        })
    }

    pub fn structure(&self) -> DeviceStructure {
        self.structure
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn profile(&self) -> &DeviceProfile {
        self.array.profile()
    }

    pub fn shape(&self) -> ArrayShape {
        self.array.shape()
    }

    pub fn batch_size(&self) -> usize {
        self.array.batch_size()
    }

    pub fn read_voltage(&self) -> f64 {
        self.read_voltage
    }

    /// Current step of every batch element
    pub fn steps(&self) -> &[u64] {
        self.clock.steps()
    }

    pub fn lut(&self) -> Option<&PulseTable> {
        self.lut.as_ref()
    }

    pub fn array(&self) -> &MemristorArray {
        &self.array
    }

    /// `1 / (G_off − G_on)`
    pub fn trans_ratio(&self) -> f64 {
        1.0 / self.profile().conductance_span()
    }
}

/// Engine options from the `[device]` codes of a run configuration
pub fn options_from_config(config: &MemsimConfig) -> Result<NonIdealities> {
    let device = &config.device;
    NonIdealities::from_codes(
        device.c2c_variation,
        device.d2d_variation,
        device.stuck_at_fault,
        device.retention_loss,
        device.aging_effect,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};

    fn ideal_record() -> Arc<DeviceRecord> {
        Arc::new(DeviceRecord::new(DeviceProfile::ideal(1e-4, 1e-3)))
    }

    fn ten_level_lut() -> PulseTable {
        PulseTable {
            total_no: 10,
            voltage: 1.1,
            conductance: (0..=10).map(|n| 1e-4 + n as f64 * 0.9e-4).collect(),
        }
    }

    fn layer(structure: DeviceStructure, dims: &[usize], lut: Option<PulseTable>) -> MappingLayer {
        let device = DeviceSelection {
            name: "ideal".to_string(),
            record: ideal_record(),
            lut,
        };
        MappingLayer::new(structure, device, NonIdealities::ideal(), dims, 1, Some(7)).unwrap()
    }

    #[test]
    fn test_mimo_requires_lookup_table() {
        let device = DeviceSelection {
            name: "ideal".to_string(),
            record: ideal_record(),
            lut: None,
        };
        assert!(matches!(
            MappingLayer::new(DeviceStructure::Mimo, device, NonIdealities::ideal(), &[2, 2], 1, None),
            Err(MemsimError::LookupUnavailable(_))
        ));
    }

    #[test]
    fn test_mimo_starts_with_single_batch() {
        let device = DeviceSelection {
            name: "ideal".to_string(),
            record: ideal_record(),
            lut: Some(ten_level_lut()),
        };
        let layer =
            MappingLayer::new(DeviceStructure::Mimo, device, NonIdealities::ideal(), &[2, 2], 8, None)
                .unwrap();
        assert_eq!(layer.batch_size(), 1);
    }

    #[test]
    fn test_map_to_pulse_count_nearest() {
        let layer = layer(DeviceStructure::Crossbar, &[1, 3], Some(ten_level_lut()));
        let counts = layer.map_to_pulse_count(array![[0.0, 0.5, 1.0]].view()).unwrap();
        assert_eq!(counts, array![[0, 5, 10]]);
    }

    #[test]
    fn test_map_to_pulse_count_rejects_out_of_range() {
        let layer = layer(DeviceStructure::Crossbar, &[1, 2], Some(ten_level_lut()));
        assert!(matches!(
            layer.map_to_pulse_count(array![[0.2, 1.2]].view()),
            Err(MemsimError::Range(_))
        ));
        assert!(matches!(
            layer.map_to_pulse_count(array![[0.2, f64::NAN]].view()),
            Err(MemsimError::Range(_))
        ));
        assert!(matches!(
            layer.map_to_pulse_count(array![[0.2]].view()),
            Err(MemsimError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_map_without_lut() {
        let layer = layer(DeviceStructure::Crossbar, &[1, 1], None);
        assert!(matches!(
            layer.map_to_pulse_count(array![[0.5]].view()),
            Err(MemsimError::LookupUnavailable(_))
        ));
    }

    #[test]
    fn test_program_to_reaches_table_conductance() {
        let mut layer = layer(DeviceStructure::Crossbar, &[2, 2], Some(ten_level_lut()));
        let g = layer
            .program_to(array![[0.0, 0.3], [0.7, 1.0]].view())
            .unwrap()
            .clone();
        let expected = array![[1e-4, 3.7e-4], [7.3e-4, 1e-3]];
        for ((r, c), &want) in expected.indexed_iter() {
            assert!((g[[0, r, c]] - want).abs() < 1e-12, "({r},{c}): {}", g[[0, r, c]]);
        }
        // reset + 10 pulses
        assert_eq!(layer.steps(), &[11]);
    }

    #[test]
    fn test_program_to_resets_previous_programming() {
        let mut layer = layer(DeviceStructure::Crossbar, &[1, 1], Some(ten_level_lut()));
        layer.program_to(array![[1.0]].view()).unwrap();
        let g = layer.program_to(array![[0.2]].view()).unwrap();
        assert!((g[[0, 0, 0]] - 2.8e-4).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_lookup_table_is_rejected() {
        let mut lut = ten_level_lut();
        lut.conductance.pop();
        let device = DeviceSelection {
            name: "ideal".to_string(),
            record: ideal_record(),
            lut: Some(lut),
        };
        assert!(matches!(
            MappingLayer::new(DeviceStructure::Crossbar, device, NonIdealities::ideal(), &[1, 1], 1, None),
            Err(MemsimError::Configuration(_))
        ));
    }

    #[test]
    fn test_reset_ignores_spike_voltages() {
        let device = DeviceSelection {
            name: "spiking".to_string(),
            record: Arc::new(
                DeviceRecord::new(DeviceProfile::ideal(1e-4, 1e-3)).with_spike_voltages(-1.5, 1.5),
            ),
            lut: None,
        };
        let mut layer =
            MappingLayer::new(DeviceStructure::Trace, device, NonIdealities::ideal(), &[2], 1, None)
                .unwrap();
        let spikes = Array::from_shape_vec(IxDyn(&[1, 2]), vec![1.0, 1.0]).unwrap();
        layer.write_spikes(spikes.view()).unwrap();
        layer.write_spikes(spikes.view()).unwrap();
        assert_eq!(layer.array().state().x()[[0, 0, 0]], 1.0);

        // -vinput_pos would only move x by 0.5
        layer.reset(0).unwrap();
        assert_eq!(layer.array().state().x()[[0, 0, 0]], 0.0);
        assert_eq!(layer.array().state().x()[[0, 0, 1]], 0.0);
    }

    #[test]
    fn test_write_spikes_requires_spike_voltages() {
        let mut layer = layer(DeviceStructure::Trace, &[2], None);
        let spikes = Array::from_shape_vec(IxDyn(&[1, 2]), vec![1.0, 0.0]).unwrap();
        assert!(matches!(
            layer.write_spikes(spikes.view()),
            Err(MemsimError::Configuration(_))
        ));
    }

    #[test]
    fn test_write_spikes_trace_keeps_input_shape() {
        let device = DeviceSelection {
            name: "spiking".to_string(),
            record: Arc::new(
                DeviceRecord::new(DeviceProfile::ideal(1e-4, 1e-3)).with_spike_voltages(-1.5, 1.5),
            ),
            lut: None,
        };
        let mut layer =
            MappingLayer::new(DeviceStructure::Trace, device, NonIdealities::ideal(), &[2, 2], 1, None)
                .unwrap();
        let spikes =
            Array::from_shape_vec(IxDyn(&[1, 2, 2]), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let x = layer.write_spikes(spikes.view()).unwrap();
        assert_eq!(x.shape(), &[1, 2, 2]);
        assert!((x[[0, 0, 0]] - 0.5).abs() < 1e-12);
        assert!(x[[0, 0, 1]].abs() < 1e-12);
        assert!((x[[0, 1, 1]] - 0.5).abs() < 1e-12);

        let bad = Array::from_shape_vec(IxDyn(&[1, 4]), vec![1.0, 0.5, 0.0, 0.0]).unwrap();
        assert!(matches!(layer.write_spikes(bad.view()), Err(MemsimError::Range(_))));
        assert_eq!(layer.steps(), &[1]);
    }

    #[test]
    fn test_read_values_recovers_programmed_values() {
        let mut layer = layer(DeviceStructure::Crossbar, &[2, 2], Some(ten_level_lut()));
        layer.program_to(array![[0.2, 0.4], [0.6, 0.8]].view()).unwrap();

        let y = layer.read_values(array![[1.0, 0.5]].view()).unwrap();
        // y_j = Σ_i u_i · x_ij
        assert!((y[[0, 0]] - (0.2 + 0.5 * 0.6)).abs() < 1e-9);
        assert!((y[[0, 1]] - (0.4 + 0.5 * 0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_read_values_zero_input_reads_zero() {
        let layer = layer(DeviceStructure::Crossbar, &[2, 3], None);
        let y = layer.read_values(array![[0.0, 0.0]].view()).unwrap();
        assert_eq!(y, Array2::<f64>::zeros((1, 3)));
    }

    #[test]
    fn test_read_voltage_override() {
        let layer = layer(DeviceStructure::Crossbar, &[1, 1], None);
        assert!(matches!(
            layer.with_read_voltage(2.0),
            Err(MemsimError::Range(_))
        ));
        let layer = self::layer(DeviceStructure::Crossbar, &[1, 1], None)
            .with_read_voltage(0.1)
            .unwrap();
        assert_eq!(layer.read_voltage(), 0.1);
    }

    #[test]
    fn test_reset_rewinds_steps_without_rewinding_time() {
        let mut layer = layer(DeviceStructure::Crossbar, &[1, 1], Some(ten_level_lut()));
        layer.program_to(array![[0.5]].view()).unwrap();
        let before = layer.array().state().max_elapsed();
        layer.reset(0).unwrap();
        assert_eq!(layer.steps(), &[1]);
        assert!(layer.array().state().max_elapsed() >= before);
        assert_eq!(layer.array().state().x()[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_set_batch_size_restarts_clock() {
        let mut layer = layer(DeviceStructure::Crossbar, &[1, 1], None);
        layer.reset(3).unwrap();
        layer.set_batch_size(3).unwrap();
        assert_eq!(layer.steps(), &[0, 0, 0]);
        assert_eq!(layer.batch_size(), 3);
    }
}
