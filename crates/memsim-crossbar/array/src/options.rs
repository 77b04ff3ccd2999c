// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Non-ideality switches
//!
//! Each effect is toggled independently. The integer codes match the run
//! configuration record (`d2d_variation` 0–3, `retention_loss` 0–2,
//! `aging_effect` 0–2).

use std::fmt;

use memsim_crossbar_device::{MemsimError, Result};

/// Device-to-device variation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum D2dVariation {
    #[default]
    None,
    /// Conductance bounds and window exponents
    Both,
    ConductanceOnly,
    ExponentOnly,
}

impl D2dVariation {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Both),
            2 => Ok(Self::ConductanceOnly),
            3 => Ok(Self::ExponentOnly),
            other => Err(MemsimError::Configuration(format!(
                "d2d_variation must be 0-3, got {}",
                other
            ))),
        }
    }

    pub fn varies_conductance(self) -> bool {
        matches!(self, Self::Both | Self::ConductanceOnly)
    }

    pub fn varies_exponents(self) -> bool {
        matches!(self, Self::Both | Self::ExponentOnly)
    }
}

/// Retention loss model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionLoss {
    #[default]
    None,
    /// Stretched-exponential decay applied on every write
    Pulsed,
    /// Decay driven by the time a device has spent between thresholds
    Idle,
}

impl RetentionLoss {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Pulsed),
            2 => Ok(Self::Idle),
            other => Err(MemsimError::Configuration(format!(
                "retention_loss must be 0-2, got {}",
                other
            ))),
        }
    }
}

/// Conductance-bound aging law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgingEffect {
    #[default]
    None,
    /// `G(t) = G0 · (1 − k)^t`
    Exponential,
    /// `G(t) = k · t + G0`
    Linear,
}

impl AgingEffect {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Exponential),
            2 => Ok(Self::Linear),
            other => Err(MemsimError::Configuration(format!(
                "aging_effect must be 0-2, got {}",
                other
            ))),
        }
    }
}

/// The full set of non-ideality toggles of an array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NonIdealities {
    pub c2c_variation: bool,
    pub d2d_variation: D2dVariation,
    pub stuck_at_fault: bool,
    pub retention_loss: RetentionLoss,
    pub aging_effect: AgingEffect,
}

impl NonIdealities {
    /// Everything disabled
    pub fn ideal() -> Self {
        Self::default()
    }

    /// Build from configuration-record codes
    pub fn from_codes(
        c2c_variation: bool,
        d2d_variation: u8,
        stuck_at_fault: bool,
        retention_loss: u8,
        aging_effect: u8,
    ) -> Result<Self> {
        Ok(Self {
            c2c_variation,
            d2d_variation: D2dVariation::from_code(d2d_variation)?,
            stuck_at_fault,
            retention_loss: RetentionLoss::from_code(retention_loss)?,
            aging_effect: AgingEffect::from_code(aging_effect)?,
        })
    }

    pub fn is_ideal(&self) -> bool {
        *self == Self::ideal()
    }
}

impl fmt::Display for NonIdealities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "c2c={} d2d={:?} saf={} retention={:?} aging={:?}",
            self.c2c_variation,
            self.d2d_variation,
            self.stuck_at_fault,
            self.retention_loss,
            self.aging_effect
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_codes() {
        let options = NonIdealities::from_codes(true, 2, false, 1, 2).unwrap();
        assert!(options.c2c_variation);
        assert_eq!(options.d2d_variation, D2dVariation::ConductanceOnly);
        assert_eq!(options.retention_loss, RetentionLoss::Pulsed);
        assert_eq!(options.aging_effect, AgingEffect::Linear);
        assert!(!options.is_ideal());
        assert!(NonIdealities::from_codes(false, 0, false, 0, 0)
            .unwrap()
            .is_ideal());
    }

    #[test]
    fn test_invalid_codes_are_configuration_errors() {
        assert!(matches!(
            NonIdealities::from_codes(false, 4, false, 0, 0),
            Err(MemsimError::Configuration(_))
        ));
        assert!(NonIdealities::from_codes(false, 0, false, 3, 0).is_err());
        assert!(NonIdealities::from_codes(false, 0, false, 0, 9).is_err());
    }

    #[test]
    fn test_d2d_components() {
        assert!(D2dVariation::Both.varies_conductance());
        assert!(D2dVariation::Both.varies_exponents());
        assert!(!D2dVariation::ConductanceOnly.varies_exponents());
        assert!(!D2dVariation::ExponentOnly.varies_conductance());
        assert!(!D2dVariation::None.varies_conductance());
    }
}
