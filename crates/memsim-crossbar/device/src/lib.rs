// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Memristor Device Technology
//!
//! Everything that describes a single device technology, independent of how many
//! devices are instantiated:
//! - **Profile**: the immutable physical constants of one technology ([`DeviceProfile`])
//! - **Library**: the device parameter file mapping technology names to profiles
//! - **Look-up tables**: pulse-count to conductance tables used for programming
//! - **Models**: state drift physics (VTEAM)
//! - **Shape**: array geometry and device coordinates
//!
//! All quantities are plain `f64` in SI base units (siemens, volts, seconds).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod library;
pub mod lut;
pub mod models;
pub mod profile;
pub mod shape;

pub use error::{MemsimError, Result};
pub use library::{DeviceLibrary, DeviceRecord};
pub use lut::{PulseLibrary, PulseTable};
pub use models::{DriftModel, ModelParameters, VteamModel, VteamParameters, WindowExponents};
pub use profile::DeviceProfile;
pub use shape::{ArrayShape, DeviceCoordinate};
