// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Range and consistency checks run after all overrides are applied. Every
//! problem is collected and reported in a single error.

use crate::types::DEVICE_STRUCTURES;
use crate::{ConfigError, ConfigResult, MemsimConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    CodeOutOfRange { field: String, code: u8, max: u8 },
    UnknownStructure { structure: String },
    NonPositive { field: String },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CodeOutOfRange { field, code, max } => {
                write!(f, "{} = {} is outside the valid range 0-{}", field, code, max)
            }
            Self::UnknownStructure { structure } => {
                write!(
                    f,
                    "device.device_structure = '{}' is not one of {}",
                    structure,
                    DEVICE_STRUCTURES.join(", ")
                )
            }
            Self::NonPositive { field } => write!(f, "{} must be positive", field),
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Non-ideality codes within their ranges
/// - A known device structure and a non-empty device name
/// - Positive array dimensions and batch size
/// - A known log format
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &MemsimConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_device(config, &mut errors);
    validate_array(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_device(config: &MemsimConfig, errors: &mut Vec<ConfigValidationError>) {
    let device = &config.device;
    for (field, code, max) in [
        ("device.d2d_variation", device.d2d_variation, 3),
        ("device.retention_loss", device.retention_loss, 2),
        ("device.aging_effect", device.aging_effect, 2),
    ] {
        if code > max {
            errors.push(ConfigValidationError::CodeOutOfRange {
                field: field.to_string(),
                code,
                max,
            });
        }
    }

    if !DEVICE_STRUCTURES.contains(&device.device_structure.as_str()) {
        errors.push(ConfigValidationError::UnknownStructure {
            structure: device.device_structure.clone(),
        });
    }
    if device.device_name.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "device.device_name".to_string(),
        });
    }
}

fn validate_array(config: &MemsimConfig, errors: &mut Vec<ConfigValidationError>) {
    let array = &config.array;
    for (field, value) in [
        ("array.batch_size", array.batch_size),
        ("array.rows", array.rows),
        ("array.cols", array.cols),
    ] {
        if value == 0 {
            errors.push(ConfigValidationError::NonPositive {
                field: field.to_string(),
            });
        }
    }
}

fn validate_logging(config: &MemsimConfig, errors: &mut Vec<ConfigValidationError>) {
    let format = config.logging.format.to_lowercase();
    if format != "text" && format != "json" {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: format!("'{}' is not 'text' or 'json'", config.logging.format),
        });
    }
}
