// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Golden-model vector–matrix product for verifying modeled reads

use memsim_crossbar_device::{MemsimError, Result};
use ndarray::{Array3, ArrayView3, Zip};

/// Ideal batched product `[batch, 1, rows] · [batch, rows, cols] → [batch, 1, cols]`
pub fn reference_vmm(voltage: ArrayView3<f64>, conductance: ArrayView3<f64>) -> Result<Array3<f64>> {
    let (batch, rows, cols) = conductance.dim();
    if voltage.dim() != (batch, 1, rows) {
        return Err(MemsimError::shape_mismatch(
            "reference voltage",
            &[batch, 1, rows],
            voltage.shape(),
        ));
    }
    let mut output = Array3::zeros((batch, 1, cols));
    for ((mut out, v), g) in output
        .outer_iter_mut()
        .zip(voltage.outer_iter())
        .zip(conductance.outer_iter())
    {
        out.assign(&v.dot(&g));
    }
    Ok(output)
}

/// Signed error `reference − modeled`, failing when any magnitude exceeds `delta`
pub fn compare(reference: ArrayView3<f64>, modeled: ArrayView3<f64>, delta: f64) -> Result<Array3<f64>> {
    if reference.shape() != modeled.shape() {
        return Err(MemsimError::shape_mismatch(
            "modeled output",
            reference.shape(),
            modeled.shape(),
        ));
    }
    let mut error = Array3::zeros(reference.raw_dim());
    Zip::from(&mut error)
        .and(&reference)
        .and(&modeled)
        .for_each(|e, &r, &m| *e = r - m);

    if let Some(worst) = error.iter().map(|e| e.abs()).find(|e| !(*e <= delta)) {
        return Err(MemsimError::Range(format!(
            "modeled output deviates from reference by {:e} (tolerance {:e})",
            worst, delta
        )));
    }
    Ok(error)
}
