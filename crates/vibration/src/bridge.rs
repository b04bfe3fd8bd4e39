//! The vibration bridge: answers `vibrate` on its channel.

use crate::channel::{MessagingContext, MethodCall, MethodCallHandler, MethodResponse};
use crate::config::BridgeConfig;
use crate::driver::VibrationDriver;
use crate::error::{Result, VibrationError};
use crate::platform::HostContext;
use crate::request::VibrationRequest;
use crate::METHOD_VIBRATE;
use mrx_telemetry::metrics;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Exposes device vibration on a single method channel.
///
/// Each call is handled on the caller's thread and returns as soon as the
/// platform has accepted the command; the motor runs on its own. Calls are
/// independent: there is no queue, no debouncing, and the vibrator handle is
/// fetched from the host on every call.
///
/// A missing vibrator, or a platform call that fails, is logged and answered
/// with success. The caller only ever sees success or not-implemented.
#[derive(Clone)]
pub struct VibrationBridge {
    host: Arc<dyn HostContext>,
    config: BridgeConfig,
}

impl VibrationBridge {
    /// Bridge with the default configuration
    pub fn new(host: Arc<dyn HostContext>) -> Self {
        Self {
            host,
            config: BridgeConfig::default(),
        }
    }

    /// Bridge with a specific configuration
    pub fn with_config(host: Arc<dyn HostContext>, config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { host, config })
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Register on `ctx` under the configured channel name.
    pub fn install(self, ctx: &mut MessagingContext) {
        let channel = self.config.channel.clone();
        ctx.register(channel, Arc::new(self));
    }

    /// Answer one call.
    #[instrument(skip(self, call), fields(method = %call.method))]
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        metrics().increment("vibration.calls");

        if call.method != METHOD_VIBRATE {
            metrics().increment("vibration.not_implemented");
            debug!("Unsupported method");
            return MethodResponse::NotImplemented;
        }

        let request = VibrationRequest::resolve(&call.method, &call.arguments, &self.config);
        if request.clamped {
            metrics().increment("vibration.clamped");
            warn!(
                requested = %call.arguments,
                duration_ms = request.duration_millis,
                "Vibration duration out of range, clamped"
            );
        }

        match self.dispatch(&request) {
            Ok(driver) => {
                metrics().increment("vibration.fired");
                debug!(driver, duration_ms = request.duration_millis, "Vibration dispatched");
            }
            Err(VibrationError::ServiceUnavailable) => {
                metrics().increment("vibration.unavailable");
                warn!("No vibrator available, request ignored");
            }
            Err(e) => {
                metrics().increment("vibration.failed");
                warn!(error = %e, code = ?e.code(), "Vibration request failed");
            }
        }

        MethodResponse::empty()
    }

    fn dispatch(&self, request: &VibrationRequest) -> Result<&'static str> {
        let vibrator = self
            .host
            .vibrator()
            .filter(|v| v.has_vibrator())
            .ok_or(VibrationError::ServiceUnavailable)?;

        let driver = VibrationDriver::select(self.config.driver, self.host.api_level());
        driver.fire(vibrator.as_ref(), request.duration_millis)?;
        Ok(driver.name())
    }
}

impl MethodCallHandler for VibrationBridge {
    fn on_method_call(&self, call: &MethodCall) -> MethodResponse {
        self.handle(call)
    }
}

/// Build a context with the bridge installed, as an activity does at startup.
pub fn attach(host: Arc<dyn HostContext>, config: BridgeConfig) -> Result<MessagingContext> {
    let mut ctx = MessagingContext::new();
    let bridge = VibrationBridge::with_config(host, config)?;
    info!(channel = %bridge.config().channel, "Attaching vibration bridge");
    bridge.install(&mut ctx);
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::config::DriverSelection;
    use crate::platform::Amplitude;
    use crate::testing::{FixedHost, Fired, RecordingVibrator};
    use serde_json::{json, Value};

    fn bridge_at(level: u32) -> (VibrationBridge, Arc<RecordingVibrator>) {
        let vibrator = Arc::new(RecordingVibrator::new());
        let host = Arc::new(FixedHost::new(level, vibrator.clone()));
        (VibrationBridge::new(host), vibrator)
    }

    fn vibrate(arguments: Value) -> MethodCall {
        MethodCall::new("vibrate", arguments)
    }

    #[test]
    fn test_unknown_method_not_implemented() {
        let (bridge, vibrator) = bridge_at(30);
        for method in ["vibe", "Vibrate", "", "startMrXBackgroundService", "vibrate "] {
            let response = bridge.handle(&MethodCall::new(method, json!({"duration": 100})));
            assert_eq!(response, MethodResponse::NotImplemented);
        }
        assert!(vibrator.fired().is_empty());
    }

    #[test]
    fn test_unknown_method_never_touches_host() {
        let vibrator = Arc::new(RecordingVibrator::new());
        let host = Arc::new(FixedHost::new(30, vibrator));
        let bridge = VibrationBridge::new(host.clone());

        bridge.handle(&MethodCall::new("cancel", Value::Null));
        assert_eq!(host.lookups(), 0);
    }

    #[test]
    fn test_default_duration() {
        let (bridge, vibrator) = bridge_at(30);
        let response = bridge.handle(&vibrate(json!({})));

        assert_eq!(response, MethodResponse::Success(Value::Null));
        assert_eq!(
            vibrator.fired(),
            vec![Fired::OneShot { duration_millis: 500, amplitude: Amplitude::Default }]
        );
    }

    #[test]
    fn test_explicit_duration() {
        let (bridge, vibrator) = bridge_at(30);
        bridge.handle(&vibrate(json!({"duration": 1200})));
        assert_eq!(
            vibrator.fired(),
            vec![Fired::OneShot { duration_millis: 1200, amplitude: Amplitude::Default }]
        );
    }

    #[test]
    fn test_non_integer_duration_falls_back() {
        let (bridge, vibrator) = bridge_at(30);
        let response = bridge.handle(&vibrate(json!({"duration": "not-a-number"})));

        assert!(response.is_success());
        assert_eq!(
            vibrator.fired(),
            vec![Fired::OneShot { duration_millis: 500, amplitude: Amplitude::Default }]
        );
    }

    #[test]
    fn test_legacy_level_uses_duration_call_only() {
        let (bridge, vibrator) = bridge_at(25);
        bridge.handle(&vibrate(json!({"duration": 800})));
        assert_eq!(vibrator.fired(), vec![Fired::Legacy { duration_millis: 800 }]);
    }

    #[test]
    fn test_threshold_level_uses_structured() {
        let (bridge, vibrator) = bridge_at(26);
        bridge.handle(&vibrate(json!({"duration": 800})));
        assert_eq!(
            vibrator.fired(),
            vec![Fired::OneShot { duration_millis: 800, amplitude: Amplitude::Default }]
        );
    }

    #[test]
    fn test_rapid_calls_each_fire_once() {
        let vibrator = Arc::new(RecordingVibrator::new());
        let host = Arc::new(FixedHost::new(30, vibrator.clone()));
        let bridge = VibrationBridge::new(host.clone());

        bridge.handle(&vibrate(json!({"duration": 100})));
        bridge.handle(&vibrate(json!({"duration": 100})));

        assert_eq!(vibrator.fired().len(), 2);
        assert_eq!(host.lookups(), 2);
    }

    #[test]
    fn test_concurrent_calls_each_fire_once() {
        let (bridge, vibrator) = bridge_at(30);
        let bridge = Arc::new(bridge);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bridge = bridge.clone();
                std::thread::spawn(move || bridge.handle(&vibrate(json!({"duration": 40}))))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_success());
        }

        assert_eq!(vibrator.fired().len(), 8);
    }

    #[test]
    fn test_missing_service_still_succeeds() {
        let bridge = VibrationBridge::new(Arc::new(FixedHost::without_service(30)));
        assert_eq!(bridge.handle(&vibrate(json!({}))), MethodResponse::empty());
    }

    #[test]
    fn test_device_without_motor_is_not_fired() {
        let vibrator = Arc::new(RecordingVibrator::without_motor());
        let bridge = VibrationBridge::new(Arc::new(FixedHost::new(30, vibrator.clone())));

        assert!(bridge.handle(&vibrate(json!({}))).is_success());
        assert!(vibrator.fired().is_empty());
    }

    #[test]
    fn test_platform_failure_still_succeeds() {
        let vibrator = Arc::new(RecordingVibrator::failing());
        let bridge = VibrationBridge::new(Arc::new(FixedHost::new(30, vibrator)));
        assert!(bridge.handle(&vibrate(json!({}))).is_success());
    }

    #[test]
    fn test_forced_legacy_driver() {
        let vibrator = Arc::new(RecordingVibrator::new());
        let config = BridgeConfig {
            driver: DriverSelection::Legacy,
            ..BridgeConfig::default()
        };
        let bridge =
            VibrationBridge::with_config(Arc::new(FixedHost::new(34, vibrator.clone())), config)
                .unwrap();

        bridge.handle(&vibrate(json!({"duration": 60})));
        assert_eq!(vibrator.fired(), vec![Fired::Legacy { duration_millis: 60 }]);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = BridgeConfig {
            min_duration_ms: 0,
            ..BridgeConfig::default()
        };
        assert!(VibrationBridge::with_config(Arc::new(FixedHost::without_service(30)), config).is_err());
    }

    #[test]
    fn test_attach_over_the_wire() {
        let vibrator = Arc::new(RecordingVibrator::new());
        let host = Arc::new(FixedHost::new(21, vibrator.clone()));
        let ctx = attach(host, BridgeConfig::default()).unwrap();

        let call = codec::encode_method_call(&vibrate(json!({"duration": 1200})));
        let reply = ctx.send(crate::CHANNEL_NAME, &call);
        assert_eq!(codec::decode_response(&reply).unwrap(), MethodResponse::empty());
        assert_eq!(vibrator.fired(), vec![Fired::Legacy { duration_millis: 1200 }]);

        let reply = ctx.send(crate::CHANNEL_NAME, br#"{"method":"stop"}"#);
        assert!(reply.is_empty());
    }

    #[test]
    fn test_custom_channel_name() {
        let vibrator = Arc::new(RecordingVibrator::new());
        let config = BridgeConfig {
            channel: "com.example.haptics".into(),
            ..BridgeConfig::default()
        };
        let ctx = attach(Arc::new(FixedHost::new(30, vibrator.clone())), config).unwrap();

        assert!(ctx.is_registered("com.example.haptics"));
        assert!(!ctx.is_registered(crate::CHANNEL_NAME));
    }

    #[test]
    fn test_counters_move() {
        let (bridge, _vibrator) = bridge_at(30);
        let before = metrics().counter("vibration.not_implemented");
        bridge.handle(&MethodCall::new("nope", Value::Null));
        assert!(metrics().counter("vibration.not_implemented") > before);
    }
}
