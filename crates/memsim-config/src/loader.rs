// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, MemsimConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "memsim_configuration.toml";

/// Find the memsim configuration file
///
/// Search order:
/// 1. `MEMSIM_CONFIG_PATH` environment variable
/// 2. Current working directory: `./memsim_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("MEMSIM_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by MEMSIM_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "memsim configuration file '{}' not found in any of these locations:\n{}\n\nSet MEMSIM_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML. Range checks
/// are left to [`validate_config`](crate::validate_config).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<MemsimConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: MemsimConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MEMSIM_DEVICE_NAME` -> `device.device_name`
/// - `MEMSIM_DEVICE_STRUCTURE` -> `device.device_structure`
/// - `MEMSIM_BATCH_SIZE` -> `array.batch_size`
/// - `MEMSIM_SEED` -> `array.seed`
/// - `MEMSIM_DEVICE_INFO_PATH` -> `data.device_info_path`
/// - `MEMSIM_LUT_PATH` -> `data.lut_path`
/// - `MEMSIM_LOG_LEVEL` -> `logging.level`
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when a numeric variable does not parse.
pub fn apply_environment_overrides(config: &mut MemsimConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("MEMSIM_DEVICE_NAME") {
        config.device.device_name = value;
    }
    if let Ok(value) = env::var("MEMSIM_DEVICE_STRUCTURE") {
        config.device.device_structure = value;
    }
    if let Ok(value) = env::var("MEMSIM_BATCH_SIZE") {
        config.array.batch_size = parse_number("MEMSIM_BATCH_SIZE", &value)?;
    }
    if let Ok(value) = env::var("MEMSIM_SEED") {
        config.array.seed = Some(parse_number("MEMSIM_SEED", &value)?);
    }
    if let Ok(value) = env::var("MEMSIM_DEVICE_INFO_PATH") {
        config.data.device_info_path = PathBuf::from(value);
    }
    if let Ok(value) = env::var("MEMSIM_LUT_PATH") {
        config.data.lut_path = PathBuf::from(value);
    }
    if let Ok(value) = env::var("MEMSIM_LOG_LEVEL") {
        config.logging.level = value;
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"device_name": "ferro", "batch_size": "8"}`)
pub fn apply_cli_overrides(
    config: &mut MemsimConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("device_name") {
        config.device.device_name = value.clone();
    }
    if let Some(value) = cli_args.get("device_structure") {
        config.device.device_structure = value.clone();
    }
    if let Some(value) = cli_args.get("batch_size") {
        config.array.batch_size = parse_number("batch_size", value)?;
    }
    if let Some(value) = cli_args.get("seed") {
        config.array.seed = Some(parse_number("seed", value)?);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}' is not a valid number", name, value)))
}
