// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end behavior of the array engine through the umbrella crate

use std::sync::Arc;

use memsim::prelude::*;
use ndarray::{array, Array3};

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

fn ideal_profile() -> Arc<DeviceProfile> {
    Arc::new(DeviceProfile::ideal(1e-4, 1e-3))
}

fn ideal_array(rows: usize, cols: usize) -> MemristorArray {
    MemristorArray::configure(
        1,
        ArrayShape::new(rows, cols).unwrap(),
        ideal_profile(),
        NonIdealities::ideal(),
        Some(2024),
    )
    .unwrap()
}

/// Profile with every non-ideality constant set to a visible value
fn noisy_profile() -> Arc<DeviceProfile> {
    let mut profile = DeviceProfile::ideal(7e-5, 9e-4).with_d2d_percentage(0.1).unwrap();
    profile.p_on = 0.5;
    profile.p_off = 0.5;
    profile.pon_sigma = 0.05;
    profile.poff_sigma = 0.05;
    profile.sigma_relative = 0.05;
    profile.sigma_absolute = 0.02;
    profile.retention_loss_tau = 0.05;
    profile.retention_loss_beta = 0.8;
    profile.aging_k_on = 1e-3;
    profile.aging_k_off = 1e-3;
    profile.saf_lambda = 0.1;
    profile.saf_ratio = 1.0;
    profile.saf_delta = 0.01;
    Arc::new(profile)
}

/// Program `x` device by device: one write per device, voltage masked elsewhere
fn program_device_by_device(array: &mut MemristorArray, x: &[[f64; 2]; 2]) {
    let mut t = 0.0;
    for r in 0..2 {
        for c in 0..2 {
            if x[r][c] == 0.0 {
                continue;
            }
            let mut v = Array3::zeros((1, 2, 2));
            v[[0, r, c]] = 1.0 + x[r][c];
            t += 1.0;
            array.write_at(v.view(), t).unwrap();
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Scenarios
// ═══════════════════════════════════════════════════════════

#[test]
fn test_two_by_two_programmed_read() {
    let mut array = ideal_array(2, 2);
    program_device_by_device(&mut array, &[[0.0, 0.5], [0.0, 1.0]]);

    let g = array.conductance();
    let expected_g = array![[1e-4, 5.5e-4], [1e-4, 1e-3]];
    for ((r, c), &want) in expected_g.indexed_iter() {
        assert!((g[[0, r, c]] - want).abs() < 1e-15);
    }

    let out = array.read(array![[[1.0, 0.5]]].view()).unwrap();
    assert_eq!(out.dim(), (1, 1, 2));
    assert!((out[[0, 0, 0]] - 1.5e-4).abs() < 1e-15);
    assert!((out[[0, 0, 1]] - 1.05e-3).abs() < 1e-15);
}

#[test]
fn test_read_above_v_off_fails_without_touching_state() {
    let mut array = ideal_array(2, 2);
    program_device_by_device(&mut array, &[[0.2, 0.5], [0.0, 0.9]]);
    let state_before = array.state().clone();
    let g_before = array.conductance().clone();

    let result = array.read(array![[[0.5, 1.01]]].view());
    assert!(matches!(
        result,
        Err(MemsimError::ReadVoltageOutOfRange { .. })
    ));
    assert_eq!(array.state(), &state_before);
    assert_eq!(array.conductance(), &g_before);
}

#[test]
fn test_ideal_single_device_is_ohms_law() {
    for (x, v) in [(0.3, 0.7), (0.0, -0.25), (1.0, 1.0), (0.85, -1.0)] {
        let mut array = ideal_array(1, 1);
        array.write_at(array![[[1.0 + x]]].view(), 1.0).unwrap();
        let g = 1e-4 + x * 9e-4;
        let out = array.read(array![[[v]]].view()).unwrap();
        assert!((out[[0, 0, 0]] - v * g).abs() < 1e-15, "x={x} v={v}");
    }
}

#[test]
fn test_drift_threshold_and_monotonicity() {
    let mut array = ideal_array(1, 3);
    array
        .write_at(array![[[1.0, 1.2, 1.4]]].view(), 1.0)
        .unwrap();
    let x = array.state().x();
    assert_eq!(x[[0, 0, 0]], 0.0);
    assert!(x[[0, 0, 1]] > 0.0);
    assert!(x[[0, 0, 2]] > x[[0, 0, 1]]);
}

#[test]
fn test_read_is_idempotent_with_all_non_idealities() {
    let options = NonIdealities::from_codes(true, 1, true, 1, 1).unwrap();
    let mut array = MemristorArray::configure(
        2,
        ArrayShape::new(3, 3).unwrap(),
        noisy_profile(),
        options,
        Some(5),
    )
    .unwrap();
    array
        .write_at(Array3::from_elem((1, 3, 3), 1.3).view(), 1.0)
        .unwrap();

    let v = Array3::from_elem((2, 1, 3), 0.4);
    let first = array.read(v.view()).unwrap();
    let second = array.read(v.view()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_state_stays_clamped_for_many_seeds() {
    let voltages = [2.5, -3.0, 0.3, 1.8, -1.2, 4.0, 0.0, -5.0];
    for seed in 0..16 {
        for retention in [1, 2] {
            let options = NonIdealities::from_codes(true, 1, true, retention, (seed % 2 + 1) as u8)
                .unwrap();
            let mut array = MemristorArray::configure(
                2,
                ArrayShape::new(4, 4).unwrap(),
                noisy_profile(),
                options,
                Some(seed),
            )
            .unwrap();
            for (step, &v) in voltages.iter().enumerate() {
                array
                    .write_at(Array3::from_elem((1, 4, 4), v).view(), step as f64)
                    .unwrap();
                array.update_fault_mask();
                assert!(array.state().x().iter().all(|x| (0.0..=1.0).contains(x)));
                assert!(array.observed_state().iter().all(|x| (0.0..=1.0).contains(x)));
            }
        }
    }
}

#[test]
fn test_stuck_devices_contribute_effective_bounds() {
    let mut profile = DeviceProfile::ideal(1e-4, 1e-3);
    profile.saf_lambda = 0.5;
    profile.saf_ratio = 1.0;
    let options = NonIdealities {
        stuck_at_fault: true,
        ..NonIdealities::ideal()
    };
    let mut array = MemristorArray::configure(
        1,
        ArrayShape::new(8, 8).unwrap(),
        Arc::new(profile),
        options,
        Some(99),
    )
    .unwrap();

    for (step, v) in [2.0, -3.0, 1.5].into_iter().enumerate() {
        array
            .write_at(Array3::from_elem((1, 8, 8), v).view(), step as f64 + 1.0)
            .unwrap();
        let faults = array.faults().unwrap();
        let (g_on, g_off) = array.effective_bounds();
        for ((r, c), &stuck) in faults.saf0().indexed_iter() {
            if stuck {
                assert_eq!(array.conductance()[[0, r, c]], g_on[[0, r, c]]);
            }
        }
        for ((r, c), &stuck) in faults.saf1().indexed_iter() {
            if stuck {
                assert_eq!(array.conductance()[[0, r, c]], g_off[[0, r, c]]);
            }
        }
    }
}

#[test]
fn test_fault_mask_unchanged_without_growth() {
    let mut profile = DeviceProfile::ideal(1e-4, 1e-3);
    profile.saf_lambda = 0.3;
    profile.saf_ratio = 2.0;
    profile.saf_delta = 0.0;
    let options = NonIdealities {
        stuck_at_fault: true,
        ..NonIdealities::ideal()
    };
    let mut array = MemristorArray::configure(
        1,
        ArrayShape::new(6, 6).unwrap(),
        Arc::new(profile),
        options,
        Some(3),
    )
    .unwrap();
    array
        .write_at(Array3::from_elem((1, 6, 6), 1.5).view(), 100.0)
        .unwrap();

    let saf0 = array.faults().unwrap().saf0().clone();
    let saf1 = array.faults().unwrap().saf1().clone();
    assert_eq!(array.update_fault_mask(), 0);
    assert_eq!(array.faults().unwrap().saf0(), &saf0);
    assert_eq!(array.faults().unwrap().saf1(), &saf1);
}

#[test]
fn test_reference_vmm_agrees_with_engine() {
    let mut array = ideal_array(2, 2);
    program_device_by_device(&mut array, &[[0.1, 0.7], [0.4, 0.0]]);
    let v = array![[[0.3, -0.6]]];
    let modeled = array.read(v.view()).unwrap();
    let reference = reference_vmm(v.view(), array.conductance().view()).unwrap();
    let error = compare(reference.view(), modeled.view(), 1e-12).unwrap();
    assert!(error.iter().all(|e| e.abs() < 1e-18));
}
