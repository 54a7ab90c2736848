//! Update broadcast sent whenever gesture bindings change.

use crate::error::Result;
use gestures_driver::Gesture;
use gestures_events::{event_names, BindingsUpdate, EventBus};
use gestures_storage::{prefs, PreferenceStore};

/// Emit the current bindings on `gestures:update_settings`.
///
/// The table is rebuilt from the preference store every time, so the
/// receiver always gets the complete set rather than a delta.
pub fn send_update_broadcast(
    events: &dyn EventBus,
    store: &dyn PreferenceStore,
    gestures: &[Gesture],
    defaults: &[i32],
) -> Result<BindingsUpdate> {
    let update = prefs::current_bindings(store, gestures, defaults);
    let payload = serde_json::to_value(&update)?;
    events.emit(event_names::UPDATE_SETTINGS, payload);

    tracing::debug!(gestures = gestures.len(), "gesture update broadcast sent");
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestures_events::{ActionCode, InMemoryEventBus};
    use gestures_storage::InMemoryPreferences;

    #[test]
    fn test_broadcast_carries_full_table() {
        let events = InMemoryEventBus::new();
        let store = InMemoryPreferences::new();
        let gestures = vec![Gesture::new(0, "letter_c", 250), Gesture::new(1, "letter_v", 251)];
        prefs::put_action(&store, &gestures[1], ActionCode::Email).unwrap();

        let update = send_update_broadcast(&events, &store, &gestures, &[2]).unwrap();
        assert_eq!(update.pairs(), Some(vec![(250, 2), (251, 5)]));

        let sent = events.events_for(event_names::UPDATE_SETTINGS);
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].payload,
            serde_json::json!({"keycode_mappings": [250, 251], "action_mappings": [2, 5]})
        );
    }
}
