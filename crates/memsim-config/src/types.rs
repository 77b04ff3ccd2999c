// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `memsim_configuration.toml`. Every field has a
//! default, so a file only needs to name what it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Device structures understood by the mapping layer
pub const DEVICE_STRUCTURES: &[&str] = &["trace", "crossbar", "mimo"];

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MemsimConfig {
    pub device: DeviceConfig,
    pub array: ArrayConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

/// Device technology and non-ideality selection
///
/// Integer codes:
/// - `d2d_variation`: 0 none, 1 both, 2 conductance only, 3 exponent only
/// - `retention_loss`: 0 none, 1 pulsed, 2 idle
/// - `aging_effect`: 0 none, 1 exponential, 2 linear
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub device_structure: String,
    pub device_name: String,
    pub c2c_variation: bool,
    pub d2d_variation: u8,
    pub stuck_at_fault: bool,
    pub retention_loss: u8,
    pub aging_effect: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_structure: "crossbar".to_string(),
            device_name: "ideal".to_string(),
            c2c_variation: false,
            d2d_variation: 0,
            stuck_at_fault: false,
            retention_loss: 0,
            aging_effect: 0,
        }
    }
}

/// Array geometry and reproducibility
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArrayConfig {
    pub batch_size: usize,
    pub rows: usize,
    pub cols: usize,
    /// Generator seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            rows: 4,
            cols: 4,
            seed: None,
        }
    }
}

/// Locations of the device data files
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Device parameter library (JSON)
    pub device_info_path: PathBuf,
    /// Pulse look-up tables (JSON)
    pub lut_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            device_info_path: PathBuf::from("memristor_data/memristor_device_info.json"),
            lut_path: PathBuf::from("memristor_data/memristor_lut.json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
