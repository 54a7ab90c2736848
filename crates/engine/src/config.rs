//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bounded wait for a proximity reading.
pub const DEFAULT_PROXIMITY_TIMEOUT_MS: u64 = 250;

/// Default lifetime of the wake lock taken before every action.
pub const DEFAULT_GESTURE_WAKE_LOCK_MS: u64 = 3000;

/// Device capabilities and timings for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The device supports checking proximity before waking on a gesture.
    pub proximity_check_on_wake: bool,
    /// Value of the proximity preference before the user touches it.
    pub proximity_check_enabled_by_default: bool,
    pub proximity_timeout_ms: u64,
    pub gesture_wake_lock_ms: u64,
    /// Device default action per gesture id, padded with NONE when short.
    pub default_actions: Vec<i32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proximity_check_on_wake: true,
            proximity_check_enabled_by_default: false,
            proximity_timeout_ms: DEFAULT_PROXIMITY_TIMEOUT_MS,
            gesture_wake_lock_ms: DEFAULT_GESTURE_WAKE_LOCK_MS,
            default_actions: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn proximity_timeout(&self) -> Duration {
        Duration::from_millis(self.proximity_timeout_ms)
    }

    pub fn gesture_wake_lock_duration(&self) -> Duration {
        Duration::from_millis(self.gesture_wake_lock_ms)
    }
}
