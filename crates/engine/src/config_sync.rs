//! Binding updates from the settings surface into a running engine.
//!
//! Updates are posted to the dispatcher queue rather than applied in place,
//! so they are ordered with key events and proximity readings.

use crate::dispatcher::{DispatchMessage, DispatchSender};
use gestures_events::{event_names, ActionCode, BindingsUpdate, LocalEventBus};
use std::sync::Arc;

/// Decode an update into the bindings it installs.
///
/// A missing array or a length mismatch yields no bindings at all, so the
/// map ends up empty rather than stale. Pairs with an action code outside
/// [`ActionCode`] are left unbound.
pub fn bindings_from_update(update: &BindingsUpdate) -> Vec<(i32, ActionCode)> {
    let Some(pairs) = update.pairs() else {
        tracing::warn!(
            scan_codes = ?update.scan_codes.as_ref().map(Vec::len),
            action_codes = ?update.action_codes.as_ref().map(Vec::len),
            "malformed bindings update, clearing all bindings"
        );
        return Vec::new();
    };

    pairs
        .into_iter()
        .filter_map(|(scan_code, code)| match ActionCode::from_code(code) {
            Some(action) => Some((scan_code, action)),
            None => {
                tracing::warn!(scan_code, action = code, "unknown action code, gesture left unbound");
                None
            }
        })
        .collect()
}

/// Handle for pushing new bindings into a running engine.
#[derive(Clone)]
pub struct ConfigSync {
    tx: DispatchSender,
}

impl ConfigSync {
    pub(crate) fn new(tx: DispatchSender) -> Self {
        Self { tx }
    }

    /// Replace all bindings with `scan_codes[i] -> action_codes[i]`.
    pub fn apply(&self, scan_codes: Option<Vec<i32>>, action_codes: Option<Vec<i32>>) {
        self.apply_update(BindingsUpdate {
            scan_codes,
            action_codes,
        });
    }

    pub fn apply_update(&self, update: BindingsUpdate) {
        if self.tx.send(DispatchMessage::Bindings(update)).is_err() {
            tracing::debug!("dispatcher stopped, bindings update dropped");
        }
    }

    /// Apply a `gestures:update_settings` payload. Undecodable payloads
    /// count as malformed and clear the map.
    pub fn on_broadcast(&self, payload: &serde_json::Value) {
        let update = match serde_json::from_value::<BindingsUpdate>(payload.clone()) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(error = %e, "undecodable bindings update");
                BindingsUpdate::default()
            }
        };
        self.apply_update(update);
    }

    /// Receive every update broadcast on `bus`.
    ///
    /// The subscription keeps the dispatcher alive for as long as the bus
    /// exists; use [`crate::GestureHandler::shutdown`] to stop it.
    pub fn subscribe(&self, bus: &LocalEventBus) {
        let sync = self.clone();
        bus.subscribe(
            event_names::UPDATE_SETTINGS,
            Arc::new(move |payload: &serde_json::Value| sync.on_broadcast(payload)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_lengths_map_pairwise() {
        let update = BindingsUpdate::new(vec![250, 251], vec![2, 0]);
        assert_eq!(
            bindings_from_update(&update),
            vec![(250, ActionCode::Camera), (251, ActionCode::None)]
        );
    }

    #[test]
    fn test_length_mismatch_yields_nothing() {
        let update = BindingsUpdate::new(vec![1, 2], vec![5]);
        assert!(bindings_from_update(&update).is_empty());
    }

    #[test]
    fn test_missing_array_yields_nothing() {
        let update = BindingsUpdate {
            scan_codes: Some(vec![250]),
            action_codes: None,
        };
        assert!(bindings_from_update(&update).is_empty());
        assert!(bindings_from_update(&BindingsUpdate::default()).is_empty());
    }

    #[test]
    fn test_unknown_action_code_is_skipped() {
        let update = BindingsUpdate::new(vec![250, 251], vec![42, 11]);
        assert_eq!(
            bindings_from_update(&update),
            vec![(251, ActionCode::VolumeUp)]
        );
    }
}
