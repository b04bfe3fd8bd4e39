//! Device vibration for the embedded UI layer.
//!
//! This crate provides:
//! - A [`VibrationBridge`] answering `vibrate` on a named method channel
//! - A host-owned [`MessagingContext`] and the JSON method codec
//! - Two vibration drivers, chosen by the platform API level
//! - An Android host backed by JNI (`target_os = "android"`)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mrx_vibration::{
//!     Amplitude, ApiLevel, HostContext, MethodCall, MethodResponse, Result, VibrationBridge,
//!     Vibrator,
//! };
//!
//! struct Silent;
//!
//! impl Vibrator for Silent {
//!     fn has_vibrator(&self) -> bool { true }
//!     fn vibrate_one_shot(&self, _ms: u64, _amplitude: Amplitude) -> Result<()> { Ok(()) }
//!     fn vibrate_legacy(&self, _ms: u64) -> Result<()> { Ok(()) }
//! }
//!
//! struct Host;
//!
//! impl HostContext for Host {
//!     fn api_level(&self) -> ApiLevel { ApiLevel(33) }
//!     fn vibrator(&self) -> Option<Arc<dyn Vibrator>> { Some(Arc::new(Silent)) }
//! }
//!
//! let bridge = VibrationBridge::new(Arc::new(Host));
//! let call = MethodCall::new("vibrate", serde_json::json!({ "duration": 1200 }));
//! assert_eq!(bridge.handle(&call), MethodResponse::empty());
//! ```

#![warn(missing_docs)]

mod bridge;
mod channel;
pub mod codec;
mod config;
mod driver;
mod error;
mod platform;
mod request;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(test)]
mod testing;

pub use bridge::{attach, VibrationBridge};
pub use channel::{AttachedChannels, MessagingContext, MethodCall, MethodCallHandler, MethodResponse};
pub use config::{BridgeConfig, DriverSelection};
pub use driver::{LegacyDurationDriver, StructuredEffectDriver, VibrationDriver};
pub use error::{Result, VibrationError, VibrationErrorCode};
pub use platform::{Amplitude, ApiLevel, HostContext, Vibrator};
pub use request::{VibrateArgs, VibrationRequest};

/// Default channel the bridge registers under
pub const CHANNEL_NAME: &str = "app.channel.vibration";

/// The only method the bridge implements
pub const METHOD_VIBRATE: &str = "vibrate";

/// Duration used when a call carries no usable `duration`
pub const DEFAULT_DURATION_MS: u64 = 500;
