//! Settings and boot restore against a file-backed preference store.

use gestures_driver::{Gesture, InMemoryDriver};
use gestures_events::{event_names, ActionCode, InMemoryEventBus};
use gestures_settings::{restore_on_boot, GestureSettings, RestoreOutcome};
use gestures_storage::Database;
use std::sync::Arc;
use tempfile::tempdir;

fn gestures() -> Vec<Gesture> {
    vec![
        Gesture::new(0, "letter_c", 250),
        Gesture::new(1, "letter_v", 251),
    ]
}

#[test]
fn test_selection_survives_reboot() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("gestures.db");

    {
        let driver = Arc::new(InMemoryDriver::new(gestures()));
        let db = Arc::new(Database::open(&db_path).unwrap());
        let settings =
            GestureSettings::load(driver, db, Arc::new(InMemoryEventBus::new()), &[2]).unwrap();
        settings.select_action(0, ActionCode::None).unwrap();
        settings.select_action(1, ActionCode::PlayPause).unwrap();
    }

    // Fresh controller state after reboot.
    let driver = InMemoryDriver::new(gestures());
    let db = Database::open(&db_path).unwrap();
    let events = InMemoryEventBus::new();

    let outcome = restore_on_boot(true, &driver, &db, &events, &[2]).unwrap();

    assert_eq!(
        outcome,
        RestoreOutcome::Restored {
            gestures: 2,
            enabled: 1
        }
    );
    assert_eq!(driver.toggles(), vec![(0, false), (1, true)]);

    let sent = events.events_for(event_names::UPDATE_SETTINGS);
    assert_eq!(
        sent[0].payload,
        serde_json::json!({"keycode_mappings": [250, 251], "action_mappings": [0, 7]})
    );
}

#[test]
fn test_entries_read_from_database() {
    let dir = tempdir().unwrap();
    let db = Arc::new(Database::open(&dir.path().join("gestures.db")).unwrap());
    let driver = Arc::new(InMemoryDriver::new(gestures()));
    let settings =
        GestureSettings::load(driver, db.clone(), Arc::new(InMemoryEventBus::new()), &[]).unwrap();

    settings.select_action(1, ActionCode::Browser).unwrap();

    let entries = settings.entries();
    assert_eq!(entries[0].action, ActionCode::None);
    assert_eq!(entries[1].action, ActionCode::Browser);
    assert_eq!(db.keys().unwrap(), vec!["touchscreen_gesture_1".to_string()]);
}
