// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Non-Ideal Memristor Array Engine
//!
//! Batched `[batch, rows, cols]` simulation of memristor crossbars:
//! - **Array**: `configure` / `write` / `read` / `update_fault_mask`
//! - **Variation**: device-to-device draws and cycle-to-cycle noise
//! - **Faults**: stuck-at-0 / stuck-at-1 masks with time-dependent growth
//! - **Aging**: time-dependent drift of the on/off conductance bounds
//! - **Retention**: pulsed and idle conductance decay
//! - **Reference**: golden-model VMM for verification
//!
//! Every stochastic draw comes from one seeded `StdRng` owned by the array, so a
//! fixed seed and call sequence reproduce bit-identical outputs.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod aging;
pub mod array;
pub mod fault;
pub mod options;
pub mod reference;
pub mod retention;
pub mod rng;
pub mod state;
pub mod variation;

pub use aging::AgingModel;
pub use array::MemristorArray;
pub use fault::{split_threshold, FaultModel};
pub use options::{AgingEffect, D2dVariation, NonIdealities, RetentionLoss};
pub use reference::{compare, reference_vmm};
pub use retention::RetentionModel;
pub use rng::seeded_rng;
pub use state::ConductanceState;
pub use variation::{ConductanceVariation, ExponentVariation, VariationModel};

// Device layer re-exports for callers that only depend on the engine
pub use memsim_crossbar_device::{ArrayShape, DeviceProfile, MemsimError, Result};
