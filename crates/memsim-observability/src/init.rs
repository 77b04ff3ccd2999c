// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for memsim tools and tests
//!
//! Installs a console layer (text or JSON) and, with the `file-logging` feature,
//! a JSON file layer inside a timestamped run folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Logging initialization result
///
/// Keep it alive for the lifetime of the program; dropping it flushes file output.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_file: Option<PathBuf>,
    installed: bool,
}

impl LoggingGuard {
    /// Log file path, when file logging is active
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// `false` when another global subscriber was already installed
    pub fn installed(&self) -> bool {
        self.installed
    }
}

fn build_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level and debug flags.
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place and report `installed() == false`.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => debug_flags.to_filter_string(&config.level),
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(config.ansi)
            .with_filter(build_filter(&filter)?)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_target(true)
            .json()
            .with_filter(build_filter(&filter)?)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guard, log_file) = match &config.log_dir {
        Some(dir) => {
            let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            let run_folder = dir.join(format!("run_{}", timestamp));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;

            let appender = tracing_appender::rolling::never(&run_folder, "memsim.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter(&filter)?)
                .boxed();
            layers.push(file_layer);
            (Some(guard), Some(run_folder.join("memsim.log")))
        }
        None => (None, None),
    };

    #[cfg(not(feature = "file-logging"))]
    let log_file: Option<PathBuf> = None;

    let installed = Registry::default().with(layers).try_init().is_ok();
    if installed {
        tracing::debug!(filter = %filter, format = %config.format, "logging initialized");
    }

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guard: file_guard,
        log_file,
        installed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(build_filter("info").is_ok());
        assert!(build_filter("memsim_mapping=loud").is_err());
    }

    #[test]
    fn test_second_init_is_harmless() {
        let flags = CrateDebugFlags::default();
        let config = LoggingConfig {
            ansi: false,
            ..LoggingConfig::default()
        };
        let first = init_logging(&flags, &config).expect("first init");
        let second = init_logging(&flags, &config).expect("second init");
        assert!(!second.installed());
        drop(first);
    }
}
