//! Boot-time restore of driver enable bits.
//!
//! The touch controller forgets which gestures are enabled across reboots.
//! On boot the persisted choices are written back and the running engine
//! is sent the full binding table.

use crate::broadcast::send_update_broadcast;
use crate::error::Result;
use gestures_driver::{GestureCatalog, GestureDriver};
use gestures_events::EventBus;
use gestures_storage::{prefs, PreferenceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Only the system user owns the controller state.
    NotSystemUser,
    Restored { gestures: usize, enabled: usize },
}

/// Restore every gesture's enable bit from the stored actions.
///
/// Errors from the driver are returned; boot callers log them and carry on
/// with gestures disabled.
pub fn restore_on_boot(
    is_system_user: bool,
    driver: &dyn GestureDriver,
    store: &dyn PreferenceStore,
    events: &dyn EventBus,
    device_defaults: &[i32],
) -> Result<RestoreOutcome> {
    if !is_system_user {
        tracing::debug!("not running as the system user, skipping gesture restore");
        return Ok(RestoreOutcome::NotSystemUser);
    }

    let catalog = GestureCatalog::load(driver)?;
    let gestures = catalog.gestures();
    let actions = prefs::build_action_list(store, gestures, device_defaults);

    let mut enabled = 0;
    for gesture in gestures {
        let enable = actions[gesture.index()] > 0;
        if !driver.set_gesture_enabled(gesture, enable)? {
            tracing::warn!(gesture = gesture.id, enable, "driver refused gesture restore");
            continue;
        }
        if enable {
            enabled += 1;
        }
    }

    send_update_broadcast(events, store, gestures, device_defaults)?;
    tracing::info!(gestures = gestures.len(), enabled, "gesture enable bits restored");

    Ok(RestoreOutcome::Restored {
        gestures: gestures.len(),
        enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestures_driver::{Gesture, InMemoryDriver};
    use gestures_events::{event_names, ActionCode, InMemoryEventBus};
    use gestures_storage::InMemoryPreferences;

    fn driver() -> InMemoryDriver {
        InMemoryDriver::new(vec![
            Gesture::new(0, "letter_c", 250),
            Gesture::new(1, "letter_v", 251),
            Gesture::new(2, "arrow_up", 252),
        ])
    }

    #[test]
    fn test_secondary_user_skips_everything() {
        let driver = driver();
        let events = InMemoryEventBus::new();

        let outcome =
            restore_on_boot(false, &driver, &InMemoryPreferences::new(), &events, &[2]).unwrap();

        assert_eq!(outcome, RestoreOutcome::NotSystemUser);
        assert!(driver.toggles().is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_restore_writes_every_gesture_then_broadcasts() {
        let driver = driver();
        let store = InMemoryPreferences::new();
        let events = InMemoryEventBus::new();
        prefs::put_action(&store, &Gesture::new(2, "arrow_up", 252), ActionCode::VolumeUp).unwrap();

        let outcome = restore_on_boot(true, &driver, &store, &events, &[2]).unwrap();

        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                gestures: 3,
                enabled: 2
            }
        );
        assert_eq!(driver.toggles(), vec![(0, true), (1, false), (2, true)]);
        assert_eq!(events.events_for(event_names::UPDATE_SETTINGS).len(), 1);
    }

    #[test]
    fn test_refused_toggle_is_not_counted() {
        let driver = driver();
        driver.reject_toggles_for(0);
        let events = InMemoryEventBus::new();

        let outcome =
            restore_on_boot(true, &driver, &InMemoryPreferences::new(), &events, &[2]).unwrap();

        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                gestures: 3,
                enabled: 0
            }
        );
    }

    #[test]
    fn test_duplicate_driver_ids_restored_once() {
        let driver = InMemoryDriver::new(vec![
            Gesture::new(0, "letter_c", 250),
            Gesture::new(0, "letter_c_again", 260),
        ]);
        let events = InMemoryEventBus::new();

        let outcome =
            restore_on_boot(true, &driver, &InMemoryPreferences::new(), &events, &[2]).unwrap();

        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                gestures: 1,
                enabled: 1
            }
        );
        assert_eq!(driver.toggles(), vec![(0, true)]);
    }

    #[test]
    fn test_unavailable_driver_is_an_error() {
        let driver = driver();
        driver.set_available(false);
        let events = InMemoryEventBus::new();

        assert!(restore_on_boot(true, &driver, &InMemoryPreferences::new(), &events, &[]).is_err());
        assert!(events.is_empty());
    }
}
