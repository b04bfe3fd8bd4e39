//! Decoding of `vibrate` arguments into a typed request.

use crate::config::BridgeConfig;
use serde::Deserialize;
use serde_json::Value;

/// Raw arguments of a `vibrate` call.
///
/// `duration` is `None` when it is missing or is anything other than an
/// integer: strings, booleans, fractional numbers, null, lists and maps all
/// decode to `None`. Integers too large for `i64` saturate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct VibrateArgs {
    /// Requested milliseconds
    #[serde(default, deserialize_with = "lenient_integer")]
    pub duration: Option<i64>,
}

impl VibrateArgs {
    /// Decode from the channel argument value. Non-map arguments count as empty.
    pub fn from_value(arguments: &Value) -> Self {
        match arguments {
            Value::Object(_) => Self::deserialize(arguments).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer_of(&value))
}

fn integer_of(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.as_u64().is_some() {
        return Some(i64::MAX);
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// A resolved vibration request, consumed by a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibrationRequest {
    /// Invoked method name
    pub method: String,
    /// Milliseconds to vibrate, within the configured bounds
    pub duration_millis: u64,
    /// Set when the caller's value was outside the configured bounds
    pub clamped: bool,
}

impl VibrationRequest {
    /// Resolve the duration: default when absent, then clamp into the
    /// configured bounds.
    pub fn resolve(method: &str, arguments: &Value, config: &BridgeConfig) -> Self {
        let args = VibrateArgs::from_value(arguments);
        let requested = args
            .duration
            .unwrap_or(config.default_duration_ms.min(i64::MAX as u64) as i64);

        // Config may be unvalidated; an inverted pair collapses to `min`.
        let min = config.min_duration_ms;
        let max = config.max_duration_ms.max(min);
        let duration_millis = if requested < 0 {
            min
        } else {
            (requested as u64).clamp(min, max)
        };
        let clamped = requested < 0 || requested as u64 != duration_millis;

        Self {
            method: method.to_string(),
            duration_millis,
            clamped,
        }
    }
}
