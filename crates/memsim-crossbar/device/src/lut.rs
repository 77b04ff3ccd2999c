// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pulse look-up tables
//!
//! For each technology a table records the conductance reached after `n`
//! identical write pulses of amplitude `voltage`, starting from the off state,
//! for `n = 0..=total_no`:
//!
//! ```json
//! { "ideal": { "total_no": 10, "voltage": 1.1, "conductance": [1e-4, 1.9e-4, ...] } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MemsimError, Result};

/// Pulse-count to conductance table of one technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseTable {
    /// Maximum pulse count
    pub total_no: usize,
    /// Pulse amplitude (V)
    pub voltage: f64,
    /// Conductance after `n` pulses, `n = 0..=total_no`
    pub conductance: Vec<f64>,
}

impl PulseTable {
    pub fn validate(&self) -> Result<()> {
        if self.conductance.len() != self.total_no + 1 {
            return Err(MemsimError::Configuration(format!(
                "look-up table holds {} entries, expected total_no + 1 = {}",
                self.conductance.len(),
                self.total_no + 1
            )));
        }
        if !self.voltage.is_finite() || self.conductance.iter().any(|g| !g.is_finite()) {
            return Err(MemsimError::Configuration(
                "look-up table contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Pulse count whose tabulated conductance is closest to `target`.
    ///
    /// Ties resolve to the smaller count.
    pub fn nearest_pulse_count(&self, target: f64) -> usize {
        let mut best = 0;
        let mut best_err = f64::INFINITY;
        for (n, g) in self.conductance.iter().enumerate() {
            let err = (g - target).abs();
            if err < best_err {
                best = n;
                best_err = err;
            }
        }
        best
    }
}

/// Look-up tables keyed by technology name
#[derive(Debug, Clone, Default)]
pub struct PulseLibrary {
    tables: BTreeMap<String, PulseTable>,
}

impl PulseLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let tables: BTreeMap<String, PulseTable> = serde_json::from_str(json)?;
        for (name, table) in &tables {
            table
                .validate()
                .map_err(|e| MemsimError::Configuration(format!("device '{}': {}", name, e)))?;
        }
        Ok(Self { tables })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let library = Self::from_json_str(&content)?;
        info!(path = %path.display(), tables = library.tables.len(), "Loaded pulse look-up tables");
        Ok(library)
    }

    pub fn insert(&mut self, name: impl Into<String>, table: PulseTable) -> Result<()> {
        table.validate()?;
        self.tables.insert(name.into(), table);
        Ok(())
    }

    /// Table for `name`, or [`MemsimError::LookupUnavailable`]
    pub fn get(&self, name: &str) -> Result<&PulseTable> {
        self.tables
            .get(name)
            .ok_or_else(|| MemsimError::LookupUnavailable(name.to_string()))
    }
}
