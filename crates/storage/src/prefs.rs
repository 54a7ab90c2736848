//! Gesture preference keys and action-list assembly.

use crate::PreferenceStore;
use gestures_driver::Gesture;
use gestures_events::{ActionCode, BindingsUpdate};

/// Prefix shared by every gesture preference key.
pub const KEY_TOUCHSCREEN_GESTURE: &str = "touchscreen_gesture";

/// Whether a performed gesture action vibrates.
pub const KEY_HAPTIC_FEEDBACK: &str = "touchscreen_gesture_haptic_feedback";

/// Whether gestures wait for the proximity sensor before acting.
pub const KEY_PROXIMITY_ON_WAKE: &str = "proximity_on_wake";

/// Haptics are on until the user turns them off.
pub const DEFAULT_HAPTIC_FEEDBACK: bool = true;

/// Preference key holding the action bound to `gesture`.
pub fn preference_key(gesture: &Gesture) -> String {
    format!("{}_{}", KEY_TOUCHSCREEN_GESTURE, gesture.id)
}

/// String resource key for the localized gesture title.
pub fn title_key(gesture: &Gesture) -> String {
    format!("{}_{}_title", KEY_TOUCHSCREEN_GESTURE, gesture.name)
}

/// Length of an id-indexed table covering every gesture.
pub fn table_len(gestures: &[Gesture]) -> usize {
    gestures
        .iter()
        .map(|g| g.index() + 1)
        .max()
        .unwrap_or(0)
        .max(gestures.len())
}

/// Device default actions, padded with NONE up to the table length.
///
/// A default list at least as long as needed is returned unchanged.
pub fn default_actions(defaults: &[i32], gestures: &[Gesture]) -> Vec<i32> {
    let len = table_len(gestures);
    if defaults.len() >= len {
        return defaults.to_vec();
    }

    let mut filled = vec![ActionCode::None.code(); len];
    filled[..defaults.len()].copy_from_slice(defaults);
    filled
}

/// Action persisted for one gesture, or `default` when nothing usable is
/// stored.
pub fn stored_action(store: &dyn PreferenceStore, gesture: &Gesture, default: i32) -> i32 {
    let key = preference_key(gesture);
    match store.get_string(&key) {
        Ok(Some(value)) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = %key, value = %value, "stored gesture action is not a number");
            default
        }),
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to read gesture action");
            default
        }
    }
}

/// Persist the action bound to `gesture`.
pub fn put_action(
    store: &dyn PreferenceStore,
    gesture: &Gesture,
    action: ActionCode,
) -> crate::Result<()> {
    store.put_string(&preference_key(gesture), &action.code().to_string())
}

/// Current action for every gesture, indexed by gesture id.
pub fn build_action_list(
    store: &dyn PreferenceStore,
    gestures: &[Gesture],
    defaults: &[i32],
) -> Vec<i32> {
    let defaults = default_actions(defaults, gestures);
    let mut result = vec![ActionCode::None.code(); table_len(gestures)];
    for gesture in gestures {
        result[gesture.index()] = stored_action(store, gesture, defaults[gesture.index()]);
    }
    result
}

/// Scan-code/action table for the engine, one pair per gesture.
pub fn build_bindings_update(gestures: &[Gesture], actions: &[i32]) -> BindingsUpdate {
    let mut scan_codes = Vec::with_capacity(gestures.len());
    let mut action_codes = Vec::with_capacity(gestures.len());
    for gesture in gestures {
        scan_codes.push(gesture.scan_code);
        action_codes.push(
            actions
                .get(gesture.index())
                .copied()
                .unwrap_or(ActionCode::None.code()),
        );
    }
    BindingsUpdate::new(scan_codes, action_codes)
}

/// Shorthand for `build_bindings_update(gestures, &build_action_list(..))`.
pub fn current_bindings(
    store: &dyn PreferenceStore,
    gestures: &[Gesture],
    defaults: &[i32],
) -> BindingsUpdate {
    build_bindings_update(gestures, &build_action_list(store, gestures, defaults))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryPreferences;

    fn gestures() -> Vec<Gesture> {
        vec![
            Gesture::new(0, "letter_c", 250),
            Gesture::new(1, "letter_v", 251),
            Gesture::new(2, "arrow_up", 252),
        ]
    }

    #[test]
    fn test_keys() {
        let g = Gesture::new(3, "letter_o", 253);
        assert_eq!(preference_key(&g), "touchscreen_gesture_3");
        assert_eq!(title_key(&g), "touchscreen_gesture_letter_o_title");
    }

    #[test]
    fn test_defaults_are_padded_with_none() {
        assert_eq!(default_actions(&[2], &gestures()), vec![2, 0, 0]);
        assert_eq!(default_actions(&[2, 1, 7, 9], &gestures()), vec![2, 1, 7, 9]);
    }

    #[test]
    fn test_action_list_prefers_stored_values() {
        let store = InMemoryPreferences::new();
        store.put_string("touchscreen_gesture_1", "7").unwrap();

        let actions = build_action_list(&store, &gestures(), &[2, 1]);
        assert_eq!(actions, vec![2, 7, 0]);
    }

    #[test]
    fn test_unparsable_stored_value_uses_default() {
        let store = InMemoryPreferences::new();
        store.put_string("touchscreen_gesture_0", "camera").unwrap();

        let actions = build_action_list(&store, &gestures(), &[1]);
        assert_eq!(actions[0], 1);
    }

    #[test]
    fn test_sparse_ids_get_a_large_enough_table() {
        let sparse = vec![Gesture::new(4, "letter_w", 260)];
        let store = InMemoryPreferences::new();

        let actions = build_action_list(&store, &sparse, &[]);
        assert_eq!(actions.len(), 5);

        let update = build_bindings_update(&sparse, &actions);
        assert_eq!(update.pairs(), Some(vec![(260, 0)]));
    }

    #[test]
    fn test_bindings_update_is_index_aligned() {
        let store = InMemoryPreferences::new();
        put_action(&store, &gestures()[2], ActionCode::VolumeUp).unwrap();

        let update = current_bindings(&store, &gestures(), &[2]);
        assert_eq!(update.scan_codes, Some(vec![250, 251, 252]));
        assert_eq!(update.action_codes, Some(vec![2, 0, 11]));
    }
}
