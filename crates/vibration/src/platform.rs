//! Host-side capabilities the bridge depends on.
//!
//! The bridge never talks to the OS directly. The hosting activity supplies a
//! [`HostContext`], from which a [`Vibrator`] handle is re-acquired on every
//! call.

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Platform API level reported by the host (Android `SDK_INT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiLevel(pub u32);

impl ApiLevel {
    /// First level with the effect-based vibration API (Android 8.0 "O").
    pub const STRUCTURED_EFFECTS: ApiLevel = ApiLevel(26);

    /// Returns true if one-shot vibration effects are available.
    #[inline]
    pub fn supports_structured_effects(self) -> bool {
        self >= Self::STRUCTURED_EFFECTS
    }
}

impl fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {}", self.0)
    }
}

/// Strength of a one-shot effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Amplitude {
    /// Let the platform pick (`VibrationEffect.DEFAULT_AMPLITUDE`)
    #[default]
    Default,
    /// Explicit strength, 1..=255
    Level(u8),
}

impl Amplitude {
    /// Platform encoding: `-1` for the default marker, otherwise the level.
    pub fn as_platform_value(self) -> i32 {
        match self {
            Amplitude::Default => -1,
            Amplitude::Level(level) => i32::from(level.max(1)),
        }
    }
}

/// The device vibration service.
pub trait Vibrator: Send + Sync {
    /// Whether the device has a vibration motor at all.
    fn has_vibrator(&self) -> bool;

    /// Structured path: fire a one-shot effect.
    fn vibrate_one_shot(&self, duration_millis: u64, amplitude: Amplitude) -> Result<()>;

    /// Legacy path: vibrate for a duration, no amplitude control.
    fn vibrate_legacy(&self, duration_millis: u64) -> Result<()>;
}

/// What the hosting activity exposes to the bridge.
pub trait HostContext: Send + Sync {
    /// Platform API level, used only to pick a vibration driver.
    fn api_level(&self) -> ApiLevel;

    /// Fetch the vibration service; `None` if the host cannot provide one.
    fn vibrator(&self) -> Option<Arc<dyn Vibrator>>;
}
