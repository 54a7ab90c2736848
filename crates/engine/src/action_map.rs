//! Scan code to action lookup, read on every key event.

use gestures_events::ActionCode;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Result of looking a scan code up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No entry: probably not a gesture at all.
    Unbound,
    /// A known gesture. `Bound(ActionCode::None)` means the user disabled it.
    Bound(ActionCode),
}

impl Resolution {
    pub fn action(self) -> Option<ActionCode> {
        match self {
            Resolution::Unbound => None,
            Resolution::Bound(action) => Some(action),
        }
    }
}

type Bindings = HashMap<i32, ActionCode>;

/// Shared, wholesale-replaced binding table.
///
/// Writers build a complete table and swap it in; readers clone the current
/// `Arc` and never see a half-applied update.
#[derive(Clone, Default)]
pub struct ActionMap {
    current: Arc<RwLock<Arc<Bindings>>>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(bindings: impl IntoIterator<Item = (i32, ActionCode)>) -> Self {
        let map = Self::new();
        map.replace_all(bindings);
        map
    }

    pub fn resolve(&self, scan_code: i32) -> Resolution {
        match self.snapshot().get(&scan_code) {
            Some(action) => Resolution::Bound(*action),
            None => Resolution::Unbound,
        }
    }

    /// The table as of now. Later updates don't affect the returned value.
    pub fn snapshot(&self) -> Arc<Bindings> {
        self.current
            .read()
            .expect("action map lock poisoned")
            .clone()
    }

    /// Swap in a new table. Returns the number of bindings now active.
    pub fn replace_all(&self, bindings: impl IntoIterator<Item = (i32, ActionCode)>) -> usize {
        let next: Bindings = bindings.into_iter().collect();
        let len = next.len();
        *self.current.write().expect("action map lock poisoned") = Arc::new(next);
        len
    }

    pub fn clear(&self) {
        self.replace_all(std::iter::empty());
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl std::fmt::Debug for ActionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.snapshot().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scan_code_is_unbound() {
        let map = ActionMap::from_bindings([(250, ActionCode::Camera)]);
        assert_eq!(map.resolve(250), Resolution::Bound(ActionCode::Camera));
        assert_eq!(map.resolve(116), Resolution::Unbound);
        assert_eq!(map.resolve(-1), Resolution::Unbound);
    }

    #[test]
    fn test_none_is_bound_not_unbound() {
        let map = ActionMap::from_bindings([(251, ActionCode::None)]);
        assert_eq!(map.resolve(251), Resolution::Bound(ActionCode::None));
        assert_eq!(map.resolve(251).action(), Some(ActionCode::None));
    }

    #[test]
    fn test_replace_all_drops_previous_bindings() {
        let map = ActionMap::from_bindings([(250, ActionCode::Camera), (251, ActionCode::Dialer)]);
        map.replace_all([(252, ActionCode::VolumeUp)]);

        assert_eq!(map.resolve(250), Resolution::Unbound);
        assert_eq!(map.resolve(251), Resolution::Unbound);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_snapshot_is_stable_across_updates() {
        let map = ActionMap::from_bindings([(250, ActionCode::Camera)]);
        let before = map.snapshot();
        map.clear();

        assert_eq!(before.get(&250), Some(&ActionCode::Camera));
        assert!(map.is_empty());
    }

    #[test]
    fn test_clones_share_the_table() {
        let map = ActionMap::new();
        let reader = map.clone();
        map.replace_all([(250, ActionCode::Flashlight)]);
        assert_eq!(reader.resolve(250), Resolution::Bound(ActionCode::Flashlight));
    }
}
