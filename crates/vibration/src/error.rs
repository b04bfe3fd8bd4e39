//! Error types for the vibration bridge.

use thiserror::Error;

/// Result type alias for vibration operations.
pub type Result<T> = std::result::Result<T, VibrationError>;

/// Errors that can occur while talking to the platform or the UI layer.
///
/// None of these reach the caller of `vibrate`; the bridge resolves them
/// locally and logs them.
#[derive(Debug, Error)]
pub enum VibrationError {
    /// The host has no vibrator or refused to hand one out
    #[error("Vibration service unavailable")]
    ServiceUnavailable,

    /// A platform call failed
    #[error("Platform call failed: {0}")]
    Platform(String),

    /// A channel envelope did not have the expected shape
    #[error("Invalid method channel envelope: {0}")]
    Codec(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A native call arrived before the host attached the bridge
    #[error("Bridge not attached")]
    NotAttached,
}

/// Error code for programmatic handling.
/// Range: 20xxx for vibration errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationErrorCode {
    /// Vibration service unavailable
    ServiceUnavailable = 20001,
    /// Platform call failed
    Platform = 20002,
    /// Invalid envelope
    Codec = 20003,
    /// JSON parsing error
    JsonParsing = 20004,
    /// Invalid configuration
    Config = 20005,
    /// Bridge not attached
    NotAttached = 20006,
}

impl VibrationError {
    /// Returns the error code for this error.
    pub fn code(&self) -> VibrationErrorCode {
        match self {
            VibrationError::ServiceUnavailable => VibrationErrorCode::ServiceUnavailable,
            VibrationError::Platform(_) => VibrationErrorCode::Platform,
            VibrationError::Codec(_) => VibrationErrorCode::Codec,
            VibrationError::Json(_) => VibrationErrorCode::JsonParsing,
            VibrationError::Config(_) => VibrationErrorCode::Config,
            VibrationError::NotAttached => VibrationErrorCode::NotAttached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            VibrationError::ServiceUnavailable.code(),
            VibrationErrorCode::ServiceUnavailable
        );
        assert_eq!(
            VibrationError::Platform("boom".into()).code() as u32,
            20002
        );
    }

    #[test]
    fn test_every_code_in_range() {
        let errors = [
            VibrationError::ServiceUnavailable,
            VibrationError::Platform("x".into()),
            VibrationError::Codec("x".into()),
            VibrationError::Config("x".into()),
            VibrationError::NotAttached,
        ];
        for err in errors {
            let code = err.code() as u32;
            assert!((20001..=20006).contains(&code), "{err}: {code}");
        }
    }

    #[test]
    fn test_error_display() {
        let err = VibrationError::Codec("missing method".into());
        assert_eq!(
            err.to_string(),
            "Invalid method channel envelope: missing method"
        );
    }
}
