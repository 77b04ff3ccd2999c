// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # memsim-mapping
//!
//! Converts between an external value domain (weights and activations in `[0, 1]`,
//! binary spikes) and the voltage/conductance domain of a [`MemristorArray`].
//!
//! - **Pulse programming**: targets are matched against a pulse look-up table and
//!   programmed with identical fixed-amplitude pulses after a reset.
//! - **Spike writes**: binary inputs become `vinput_pos` / `vinput_neg` drives.
//! - **Value reads**: inputs are scaled by a small read voltage and the column
//!   currents are converted back to the value domain.
//!
//! [`MemristorArray`]: memsim_crossbar_array::MemristorArray

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod clock;
pub mod layer;
pub mod structure;

pub use clock::StepClock;
pub use layer::{
    options_from_config, DeviceSelection, MappingLayer, DEFAULT_READ_VOLTAGE, DEFAULT_RESET_VOLTAGE,
};
pub use structure::DeviceStructure;
