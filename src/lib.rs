// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # memsim - Non-ideal memristor array simulation
//!
//! memsim models arrays of memristive devices used for in-memory analog
//! computation. A batched state engine advances each device under applied voltage,
//! composes the enabled non-idealities into the programmed conductance, and reads
//! the array as a vector-matrix product.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! memsim = "0.1"  # Default: mapping + config + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`mapping`** (default): value-domain programming (`MappingLayer`)
//! - **`config`** (default): TOML run configuration with env/CLI overrides
//! - **`observability`** (default): tracing subscriber setup and debug flags
//!
//! The device and array crates are always available.
//!
//! ## Usage Examples
//!
//! ### Engine only
//!
//! ```rust
//! use std::sync::Arc;
//! use memsim::prelude::*;
//! use ndarray::array;
//!
//! let mut array = MemristorArray::configure(
//!     1,
//!     ArrayShape::new(1, 1)?,
//!     Arc::new(DeviceProfile::ideal(1e-4, 1e-3)),
//!     NonIdealities::ideal(),
//!     Some(42),
//! )?;
//!
//! // One step at 1.5 V moves the ideal device half way on
//! array.write_at(array![[[1.5]]].view(), 1.0)?;
//! let current = array.read(array![[[0.2]]].view())?;
//! assert!((current[[0, 0, 0]] - 0.2 * 5.5e-4).abs() < 1e-15);
//! # Ok::<(), memsim::MemsimError>(())
//! ```
//!
//! ### From a run configuration
//!
//! ```rust,no_run
//! use memsim::config::load_config;
//! use memsim::mapping::MappingLayer;
//! use ndarray::array;
//!
//! let config = load_config(None, None)?;
//! let mut layer = MappingLayer::from_config(&config)?;
//! layer.program_to(array![[0.2, 0.8], [0.5, 0.0]].view())?;
//! let y = layer.read_values(array![[1.0, 0.5]].view())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Device: memsim-crossbar-device                         │
//! │  (DeviceProfile, VTEAM drift, libraries, errors)        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Engine: memsim-crossbar-array                          │
//! │  (state, variation, faults, aging, retention, read)     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: memsim-mapping                             │
//! │  (pulse programming, spike writes, value reads)         │
//! └─────────────────────────────────────────────────────────┘
//! ```

// Re-export foundation
pub use memsim_crossbar_array as array;
pub use memsim_crossbar_device as device;

pub use memsim_crossbar_device::{MemsimError, Result};

// Re-export optional layers
#[cfg(feature = "mapping")]
pub use memsim_mapping as mapping;

#[cfg(feature = "config")]
pub use memsim_config as config;

#[cfg(feature = "observability")]
pub use memsim_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::array::{
        compare, reference_vmm, AgingEffect, D2dVariation, MemristorArray, NonIdealities,
        RetentionLoss,
    };
    pub use crate::device::{
        ArrayShape, DeviceLibrary, DeviceProfile, DeviceRecord, DriftModel, MemsimError,
        PulseLibrary, PulseTable, Result, VteamModel,
    };

    #[cfg(feature = "mapping")]
    pub use crate::mapping::{DeviceSelection, DeviceStructure, MappingLayer};

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, MemsimConfig};
}
