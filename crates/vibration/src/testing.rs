//! In-memory host and vibrator used by the unit tests.

use crate::error::{Result, VibrationError};
use crate::platform::{Amplitude, ApiLevel, HostContext, Vibrator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    OneShot { duration_millis: u64, amplitude: Amplitude },
    Legacy { duration_millis: u64 },
}

#[derive(Debug, Default)]
pub struct RecordingVibrator {
    fired: Mutex<Vec<Fired>>,
    missing_motor: bool,
    failing: bool,
}

impl RecordingVibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_motor() -> Self {
        Self {
            missing_motor: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn fired(&self) -> Vec<Fired> {
        self.fired.lock().unwrap().clone()
    }

    fn record(&self, fired: Fired) -> Result<()> {
        if self.failing {
            return Err(VibrationError::Platform("vibrator rejected command".into()));
        }
        self.fired.lock().unwrap().push(fired);
        Ok(())
    }
}

impl Vibrator for RecordingVibrator {
    fn has_vibrator(&self) -> bool {
        !self.missing_motor
    }

    fn vibrate_one_shot(&self, duration_millis: u64, amplitude: Amplitude) -> Result<()> {
        self.record(Fired::OneShot { duration_millis, amplitude })
    }

    fn vibrate_legacy(&self, duration_millis: u64) -> Result<()> {
        self.record(Fired::Legacy { duration_millis })
    }
}

/// Host with a fixed API level that counts service lookups.
pub struct FixedHost {
    level: ApiLevel,
    vibrator: Option<Arc<RecordingVibrator>>,
    lookups: AtomicUsize,
}

impl FixedHost {
    pub fn new(level: u32, vibrator: Arc<RecordingVibrator>) -> Self {
        Self {
            level: ApiLevel(level),
            vibrator: Some(vibrator),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn without_service(level: u32) -> Self {
        Self {
            level: ApiLevel(level),
            vibrator: None,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl HostContext for FixedHost {
    fn api_level(&self) -> ApiLevel {
        self.level
    }

    fn vibrator(&self) -> Option<Arc<dyn Vibrator>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.vibrator
            .clone()
            .map(|v| v as Arc<dyn Vibrator>)
    }
}
