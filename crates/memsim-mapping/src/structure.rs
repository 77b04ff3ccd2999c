// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Physical arrangement of the devices behind a mapping layer

use std::fmt;
use std::str::FromStr;

use memsim_crossbar_device::{ArrayShape, MemsimError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStructure {
    /// Independent devices laid out in a single row
    Trace,
    /// Rows x columns with shared word/bit lines
    Crossbar,
    /// Crossbar programmed from a pulse look-up table
    Mimo,
}

impl DeviceStructure {
    /// Array shape for the requested dimensions.
    ///
    /// `Trace` flattens any number of dimensions into `[1, product]`; `Crossbar`
    /// and `Mimo` take exactly `[rows, cols]`.
    pub fn array_shape(self, dims: &[usize]) -> Result<ArrayShape> {
        match self {
            DeviceStructure::Trace => {
                if dims.is_empty() {
                    return Err(MemsimError::Configuration(
                        "trace structure needs at least one dimension".to_string(),
                    ));
                }
                ArrayShape::row(dims.iter().product())
            }
            DeviceStructure::Crossbar | DeviceStructure::Mimo => match dims {
                [rows, cols] => ArrayShape::new(*rows, *cols),
                _ => Err(MemsimError::Configuration(format!(
                    "{} structure needs [rows, cols], got {:?}",
                    self, dims
                ))),
            },
        }
    }

    /// Whether construction requires a pulse look-up table
    pub fn requires_lookup_table(self) -> bool {
        matches!(self, DeviceStructure::Mimo)
    }
}

impl FromStr for DeviceStructure {
    type Err = MemsimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trace" => Ok(DeviceStructure::Trace),
            "crossbar" => Ok(DeviceStructure::Crossbar),
            "mimo" => Ok(DeviceStructure::Mimo),
            other => Err(MemsimError::Configuration(format!(
                "unsupported device structure '{}' (expected trace, crossbar or mimo)",
                other
            ))),
        }
    }
}

impl fmt::Display for DeviceStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceStructure::Trace => "trace",
            DeviceStructure::Crossbar => "crossbar",
            DeviceStructure::Mimo => "mimo",
        };
        f.write_str(name)
    }
}
