//! Bridge configuration loading

use crate::error::{Result, VibrationError};
use crate::{CHANNEL_NAME, DEFAULT_DURATION_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which vibration driver the bridge uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverSelection {
    /// Pick by the host API level on every call
    #[default]
    Auto,
    /// Always use one-shot effects
    Structured,
    /// Always use the direct-duration call
    Legacy,
}

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Channel name the bridge registers under
    pub channel: String,
    /// Duration used when the caller sends none, or sends a non-integer
    pub default_duration_ms: u64,
    /// Shorter requests are raised to this
    pub min_duration_ms: u64,
    /// Longer requests are lowered to this
    pub max_duration_ms: u64,
    /// Driver override
    pub driver: DriverSelection,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel: CHANNEL_NAME.to_string(),
            default_duration_ms: DEFAULT_DURATION_MS,
            min_duration_ms: 1,
            max_duration_ms: 10_000,
            driver: DriverSelection::Auto,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a file path, a standard location, or defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(String::from).or_else(find_config_file);

        let config = match config_path {
            Some(p) => load_config_file(&p)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the duration bounds and channel name
    pub fn validate(&self) -> Result<()> {
        if self.channel.trim().is_empty() {
            return Err(VibrationError::Config("channel must not be empty".into()));
        }
        if self.min_duration_ms == 0 {
            return Err(VibrationError::Config(
                "min_duration_ms must be at least 1".into(),
            ));
        }
        if self.min_duration_ms > self.max_duration_ms {
            return Err(VibrationError::Config(format!(
                "min_duration_ms ({}) exceeds max_duration_ms ({})",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        if !(self.min_duration_ms..=self.max_duration_ms).contains(&self.default_duration_ms) {
            return Err(VibrationError::Config(format!(
                "default_duration_ms ({}) outside {}..={}",
                self.default_duration_ms, self.min_duration_ms, self.max_duration_ms
            )));
        }
        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        ".vibration-bridge.toml",
        "vibration-bridge.toml",
        ".config/vibration-bridge.toml",
    ];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<BridgeConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        VibrationError::Config(format!("Failed to read config file {}: {}", path, e))
    })?;

    toml::from_str(&content).map_err(|e| {
        VibrationError::Config(format!("Failed to parse config file {}: {}", path, e))
    })
}
