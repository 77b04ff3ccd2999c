// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # memsim-observability
//!
//! Logging setup shared by the memsim tools and tests, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: additionally write JSON logs to a timestamped file

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known memsim crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "memsim",
    "memsim-config",
    "memsim-crossbar-device",
    "memsim-crossbar-array",
    "memsim-mapping",
];
