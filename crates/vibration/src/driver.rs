//! Vibration drivers: the two ways a pulse can be handed to the platform.

use crate::config::DriverSelection;
use crate::error::Result;
use crate::platform::{Amplitude, ApiLevel, Vibrator};

/// One-shot effect with the platform default amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructuredEffectDriver;

impl StructuredEffectDriver {
    /// Hand a one-shot effect to the vibrator.
    pub fn fire(&self, vibrator: &dyn Vibrator, duration_millis: u64) -> Result<()> {
        vibrator.vibrate_one_shot(duration_millis, Amplitude::Default)
    }
}

/// Direct-duration call for hosts below [`ApiLevel::STRUCTURED_EFFECTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyDurationDriver;

impl LegacyDurationDriver {
    /// Call the direct-duration API.
    pub fn fire(&self, vibrator: &dyn Vibrator, duration_millis: u64) -> Result<()> {
        vibrator.vibrate_legacy(duration_millis)
    }
}

/// The driver chosen for a given host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationDriver {
    /// API 26 and later
    StructuredEffect(StructuredEffectDriver),
    /// Below API 26
    LegacyDuration(LegacyDurationDriver),
}

impl VibrationDriver {
    /// Pick the driver the platform level supports.
    pub fn for_api_level(level: ApiLevel) -> Self {
        if level.supports_structured_effects() {
            VibrationDriver::StructuredEffect(StructuredEffectDriver)
        } else {
            VibrationDriver::LegacyDuration(LegacyDurationDriver)
        }
    }

    /// Apply a configured override; `Auto` defers to the API level.
    pub fn select(selection: DriverSelection, level: ApiLevel) -> Self {
        match selection {
            DriverSelection::Auto => Self::for_api_level(level),
            DriverSelection::Structured => VibrationDriver::StructuredEffect(StructuredEffectDriver),
            DriverSelection::Legacy => VibrationDriver::LegacyDuration(LegacyDurationDriver),
        }
    }

    /// Trigger one pulse of `duration_millis`.
    pub fn fire(&self, vibrator: &dyn Vibrator, duration_millis: u64) -> Result<()> {
        match self {
            VibrationDriver::StructuredEffect(driver) => driver.fire(vibrator, duration_millis),
            VibrationDriver::LegacyDuration(driver) => driver.fire(vibrator, duration_millis),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            VibrationDriver::StructuredEffect(_) => "structured_effect",
            VibrationDriver::LegacyDuration(_) => "legacy_duration",
        }
    }
}
