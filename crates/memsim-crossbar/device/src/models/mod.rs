// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Drift Model Architecture
//!
//! A drift model advances the normalized state `x ∈ [0, 1]` of one device for one
//! simulation step under an applied voltage.
//!
//! ## Adding a New Drift Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement the `DriftModel` trait
//! 3. Add tests
//! 4. Export in `mod.rs`

pub mod traits;
pub mod vteam;

pub use traits::{DriftModel, ModelParameters, WindowExponents};
pub use vteam::{VteamModel, VteamParameters};
