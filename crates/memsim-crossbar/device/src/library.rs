// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Device parameter file
//!
//! A JSON object mapping technology names to records that carry every
//! [`DeviceProfile`] field plus optional spike-domain write voltages:
//!
//! ```json
//! { "ideal": { "delta_t": 1.0, "k_on": -1.0, ..., "vinput_neg": -1.0, "vinput_pos": 2.0 } }
//! ```
//!
//! Unknown keys in a record are ignored.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MemsimError, Result};
use crate::profile::DeviceProfile;

/// One entry of the device library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(flatten)]
    pub profile: DeviceProfile,
    /// Write voltage for a `0` spike
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vinput_neg: Option<f64>,
    /// Write voltage for a `1` spike
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vinput_pos: Option<f64>,
}

impl DeviceRecord {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            vinput_neg: None,
            vinput_pos: None,
        }
    }

    pub fn with_spike_voltages(mut self, vinput_neg: f64, vinput_pos: f64) -> Self {
        self.vinput_neg = Some(vinput_neg);
        self.vinput_pos = Some(vinput_pos);
        self
    }

    /// Spike voltages as `(neg, pos)` when both are present
    pub fn spike_voltages(&self) -> Option<(f64, f64)> {
        match (self.vinput_neg, self.vinput_pos) {
            (Some(neg), Some(pos)) => Some((neg, pos)),
            _ => None,
        }
    }
}

/// Named collection of device technologies
#[derive(Debug, Clone, Default)]
pub struct DeviceLibrary {
    devices: BTreeMap<String, Arc<DeviceRecord>>,
}

impl DeviceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a device library from JSON text.
    ///
    /// Every record must carry all profile fields and satisfy
    /// [`DeviceProfile::validate`]; the error names the offending device.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for (name, value) in raw {
            let record: DeviceRecord = serde_json::from_value(value).map_err(|e| {
                MemsimError::Configuration(format!("device '{}': {}", name, e))
            })?;
            library.insert(name, record)?;
        }
        debug!(devices = library.len(), "Parsed device library");
        Ok(library)
    }

    /// Load a device library file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let library = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            devices = library.len(),
            "Loaded device library"
        );
        Ok(library)
    }

    /// Add or replace a device after validating its profile
    pub fn insert(&mut self, name: impl Into<String>, record: DeviceRecord) -> Result<()> {
        let name = name.into();
        record
            .profile
            .validate()
            .map_err(|e| MemsimError::Configuration(format!("device '{}': {}", name, e)))?;
        self.devices.insert(name, Arc::new(record));
        Ok(())
    }

    /// Look up a device by technology name
    pub fn get(&self, name: &str) -> Result<Arc<DeviceRecord>> {
        self.devices.get(name).cloned().ok_or_else(|| {
            MemsimError::Configuration(format!(
                "unknown memristor device '{}' (available: {})",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ideal_json() -> serde_json::Value {
        let mut value = serde_json::to_value(DeviceProfile::ideal(1e-4, 1e-3)).unwrap();
        value["vinput_neg"] = serde_json::json!(-1.5);
        value["vinput_pos"] = serde_json::json!(1.5);
        value["cycle"] = serde_json::json!(0.5);
        value
    }

    #[test]
    fn test_parse_library() {
        let json = serde_json::json!({ "ideal": ideal_json() }).to_string();
        let library = DeviceLibrary::from_json_str(&json).unwrap();
        assert_eq!(library.len(), 1);
        let record = library.get("ideal").unwrap();
        assert_eq!(record.profile.g_on, 1e-4);
        assert_eq!(record.spike_voltages(), Some((-1.5, 1.5)));
    }

    #[test]
    fn test_missing_field_names_device() {
        let mut value = ideal_json();
        value.as_object_mut().unwrap().remove("G_off");
        let json = serde_json::json!({ "broken": value }).to_string();
        let err = DeviceLibrary::from_json_str(&json).unwrap_err();
        match err {
            MemsimError::Configuration(msg) => {
                assert!(msg.contains("broken"));
                assert!(msg.contains("G_off"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut value = ideal_json();
        value["v_on"] = serde_json::json!(0.5);
        let json = serde_json::json!({ "bad": value }).to_string();
        assert!(matches!(
            DeviceLibrary::from_json_str(&json),
            Err(MemsimError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_device() {
        let library = DeviceLibrary::new();
        assert!(matches!(
            library.get("ferro"),
            Err(MemsimError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::json!({ "ideal": ideal_json() }).to_string();
        file.write_all(json.as_bytes()).unwrap();

        let library = DeviceLibrary::load(file.path()).unwrap();
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["ideal"]);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DeviceLibrary::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(MemsimError::Io(_))));
    }
}
