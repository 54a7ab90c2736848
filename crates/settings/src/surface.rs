//! Model behind the gesture settings screen.
//!
//! One single-choice entry per supported gesture plus the two toggles.
//! Rendering is left to whoever owns the screen; this type only knows what
//! to show and what a selection does.

use crate::broadcast::send_update_broadcast;
use crate::error::{Result, SettingsError};
use gestures_driver::{Gesture, GestureCatalog, GestureDriverRef};
use gestures_events::{ActionCode, EventBusRef};
use gestures_storage::prefs::{
    self, DEFAULT_HAPTIC_FEEDBACK, KEY_HAPTIC_FEEDBACK, KEY_PROXIMITY_ON_WAKE,
};
use gestures_storage::PreferenceStoreRef;
use serde::Serialize;

/// One gesture as shown on the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GestureEntry {
    pub gesture: Gesture,
    /// Preference key the selection persists under.
    pub key: String,
    /// String resource key of the localized title.
    pub title_key: String,
    pub action: ActionCode,
    pub default_action: ActionCode,
    pub icon: &'static str,
}

/// One selectable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionChoice {
    pub value: i32,
    pub name: &'static str,
    pub icon: &'static str,
}

pub struct GestureSettings {
    driver: GestureDriverRef,
    preferences: PreferenceStoreRef,
    events: EventBusRef,
    gestures: Vec<Gesture>,
    defaults: Vec<i32>,
}

impl GestureSettings {
    /// Query the driver for the supported gestures.
    ///
    /// Goes through [`GestureCatalog`] so the screen lists exactly the
    /// gestures the engine binds.
    pub fn load(
        driver: GestureDriverRef,
        preferences: PreferenceStoreRef,
        events: EventBusRef,
        device_defaults: &[i32],
    ) -> Result<Self> {
        let gestures = GestureCatalog::load(driver.as_ref())?.gestures().to_vec();
        let defaults = prefs::default_actions(device_defaults, &gestures);
        Ok(Self {
            driver,
            preferences,
            events,
            gestures,
            defaults,
        })
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    pub fn entries(&self) -> Vec<GestureEntry> {
        self.gestures
            .iter()
            .map(|gesture| {
                let default_action = self.default_action(gesture);
                let stored = prefs::stored_action(
                    self.preferences.as_ref(),
                    gesture,
                    default_action.code(),
                );
                let action = ActionCode::from_code(stored).unwrap_or_default();
                GestureEntry {
                    gesture: gesture.clone(),
                    key: prefs::preference_key(gesture),
                    title_key: prefs::title_key(gesture),
                    action,
                    default_action,
                    icon: action.icon(),
                }
            })
            .collect()
    }

    /// Every action the user can pick, in display order.
    pub fn choices() -> Vec<ActionChoice> {
        ActionCode::ALL
            .iter()
            .map(|action| ActionChoice {
                value: action.code(),
                name: action.name(),
                icon: action.icon(),
            })
            .collect()
    }

    /// Bind `action` to a gesture.
    ///
    /// The driver is told first; if it refuses, nothing is persisted and
    /// the caller should revert the selection. On success the choice is
    /// stored and the full table is broadcast.
    pub fn select_action(&self, gesture_id: u32, action: ActionCode) -> Result<()> {
        let gesture = self
            .gestures
            .iter()
            .find(|g| g.id == gesture_id)
            .ok_or(SettingsError::UnknownGesture(gesture_id))?;

        if !self.driver.set_gesture_enabled(gesture, !action.is_none())? {
            tracing::warn!(gesture = gesture.id, action = %action, "driver rejected gesture toggle");
            return Err(SettingsError::Rejected {
                gesture: gesture.id,
                action,
            });
        }

        prefs::put_action(self.preferences.as_ref(), gesture, action)?;
        tracing::info!(gesture = %gesture.name, action = %action, "gesture action changed");

        send_update_broadcast(
            self.events.as_ref(),
            self.preferences.as_ref(),
            &self.gestures,
            &self.defaults,
        )?;
        Ok(())
    }

    pub fn haptic_feedback(&self) -> bool {
        self.preferences
            .get_bool(KEY_HAPTIC_FEEDBACK, DEFAULT_HAPTIC_FEEDBACK)
    }

    pub fn set_haptic_feedback(&self, enabled: bool) -> Result<()> {
        self.preferences.put_bool(KEY_HAPTIC_FEEDBACK, enabled)?;
        Ok(())
    }

    /// The proximity toggle; `default` is the device's
    /// enabled-by-default setting.
    pub fn proximity_on_wake(&self, default: bool) -> bool {
        self.preferences.get_bool(KEY_PROXIMITY_ON_WAKE, default)
    }

    pub fn set_proximity_on_wake(&self, enabled: bool) -> Result<()> {
        self.preferences.put_bool(KEY_PROXIMITY_ON_WAKE, enabled)?;
        Ok(())
    }

    fn default_action(&self, gesture: &Gesture) -> ActionCode {
        self.defaults
            .get(gesture.index())
            .copied()
            .and_then(ActionCode::from_code)
            .unwrap_or_default()
    }
}
