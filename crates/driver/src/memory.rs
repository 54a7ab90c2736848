//! In-memory gesture driver.
//!
//! Stands in for the vendor service in tests and in the headless daemon.

use crate::error::DriverError;
use crate::{Gesture, GestureDriver};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Driver fake that keeps enable bits in memory and records every toggle.
pub struct InMemoryDriver {
    gestures: Vec<Gesture>,
    available: AtomicBool,
    enabled: Mutex<HashMap<u32, bool>>,
    rejected: Mutex<HashSet<u32>>,
    toggles: Mutex<Vec<(u32, bool)>>,
}

impl InMemoryDriver {
    pub fn new(gestures: Vec<Gesture>) -> Self {
        Self {
            gestures,
            available: AtomicBool::new(true),
            enabled: Mutex::new(HashMap::new()),
            rejected: Mutex::new(HashSet::new()),
            toggles: Mutex::new(Vec::new()),
        }
    }

    /// Simulate the service disappearing (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make `set_gesture_enabled` report failure for this gesture.
    pub fn reject_toggles_for(&self, gesture_id: u32) {
        self.rejected.lock().unwrap().insert(gesture_id);
    }

    /// Current enable bit as last written, if ever written.
    pub fn is_enabled(&self, gesture_id: u32) -> Option<bool> {
        self.enabled.lock().unwrap().get(&gesture_id).copied()
    }

    /// Every successful `(gesture_id, enabled)` call, in order.
    pub fn toggles(&self) -> Vec<(u32, bool)> {
        self.toggles.lock().unwrap().clone()
    }

    fn ensure_available(&self) -> Result<(), DriverError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DriverError::Unavailable("in-memory driver offline".to_string()))
        }
    }
}

impl GestureDriver for InMemoryDriver {
    fn list_supported_gestures(&self) -> Result<Vec<Gesture>, DriverError> {
        self.ensure_available()?;
        Ok(self.gestures.clone())
    }

    fn set_gesture_enabled(&self, gesture: &Gesture, enabled: bool) -> Result<bool, DriverError> {
        self.ensure_available()?;
        if !self.gestures.iter().any(|g| g.id == gesture.id) {
            return Err(DriverError::UnknownGesture(gesture.id));
        }
        if self.rejected.lock().unwrap().contains(&gesture.id) {
            return Ok(false);
        }

        self.enabled.lock().unwrap().insert(gesture.id, enabled);
        self.toggles.lock().unwrap().push((gesture.id, enabled));
        tracing::debug!(gesture = gesture.id, enabled, "gesture enable bit written");
        Ok(true)
    }
}
