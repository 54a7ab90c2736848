//! Shared event contracts for touchscreen gesture components.
//!
//! This crate defines the formal contracts (DTOs) for events that flow
//! between the settings surface, the boot restore routine and the running
//! dispatch engine. Using shared types prevents runtime deserialization
//! errors from mismatched field names.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod action;
mod bus;

pub use action::{ActionCode, UnknownAction};
pub use bus::{
    EmittedEvent, EventBus, EventBusRef, EventHandler, InMemoryEventBus, LocalEventBus,
    NullEventBus,
};

use serde::{Deserialize, Serialize};

/// Permission a receiver must hold to see the screen-camera broadcast.
pub const STATUS_BAR_SERVICE_PERMISSION: &str = "android.permission.STATUS_BAR_SERVICE";

/// Scan-code to action table pushed to the running engine.
///
/// `scan_codes[i]` is bound to `action_codes[i]`. Either array may be
/// missing on the wire; a missing or mismatched pair is malformed.
///
/// Producers: settings surface, boot restore
/// Consumers: dispatch engine (ConfigSync)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingsUpdate {
    #[serde(rename = "keycode_mappings", default)]
    pub scan_codes: Option<Vec<i32>>,
    #[serde(rename = "action_mappings", default)]
    pub action_codes: Option<Vec<i32>>,
}

impl BindingsUpdate {
    pub fn new(scan_codes: Vec<i32>, action_codes: Vec<i32>) -> Self {
        Self {
            scan_codes: Some(scan_codes),
            action_codes: Some(action_codes),
        }
    }

    /// Index-aligned `(scan_code, action_code)` pairs.
    ///
    /// Returns `None` when either array is missing or the lengths differ.
    pub fn pairs(&self) -> Option<Vec<(i32, i32)>> {
        let scan_codes = self.scan_codes.as_ref()?;
        let action_codes = self.action_codes.as_ref()?;
        if scan_codes.len() != action_codes.len() {
            return None;
        }
        Some(
            scan_codes
                .iter()
                .copied()
                .zip(action_codes.iter().copied())
                .collect(),
        )
    }
}

/// Signal asking the system UI to open the camera after a gesture.
///
/// Producers: dispatch engine (camera action)
/// Consumers: privileged receivers holding `receiver_permission`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraGestureEvent {
    pub receiver_permission: String,
    /// Target user; the engine always addresses the current user.
    pub user: String,
    /// Timestamp in milliseconds since epoch.
    pub ts_ms: i64,
}

impl CameraGestureEvent {
    pub fn for_current_user() -> Self {
        Self {
            receiver_permission: STATUS_BAR_SERVICE_PERMISSION.to_string(),
            user: "current".to_string(),
            ts_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Bindings changed; payload is a `BindingsUpdate`.
    pub const UPDATE_SETTINGS: &str = "gestures:update_settings";
    /// Camera gesture performed; payload is a `CameraGestureEvent`.
    pub const SCREEN_CAMERA_GESTURE: &str = "gestures:screen_camera_gesture";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_update_wire_names() {
        let json = r#"{"keycode_mappings": [250, 251], "action_mappings": [2, 0]}"#;
        let update: BindingsUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.pairs(), Some(vec![(250, 2), (251, 0)]));
    }

    #[test]
    fn test_bindings_update_missing_field_is_malformed() {
        let json = r#"{"keycode_mappings": [250]}"#;
        let update: BindingsUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.action_codes, None);
        assert_eq!(update.pairs(), None);
    }

    #[test]
    fn test_bindings_update_length_mismatch_is_malformed() {
        let update = BindingsUpdate::new(vec![1, 2], vec![5]);
        assert_eq!(update.pairs(), None);
    }

    #[test]
    fn test_camera_event_targets_status_bar() {
        let event = CameraGestureEvent::for_current_user();
        assert_eq!(event.receiver_permission, STATUS_BAR_SERVICE_PERMISSION);
        assert_eq!(event.user, "current");
    }
}
