//! Gesture catalog - the static list of supported gestures.

use crate::error::DriverError;
use crate::{Gesture, GestureDriver};

/// Supported gestures, queried once from the driver.
#[derive(Debug, Clone, Default)]
pub struct GestureCatalog {
    gestures: Vec<Gesture>,
}

impl GestureCatalog {
    /// Query the driver for its supported gestures.
    ///
    /// Gestures reusing an id already seen are dropped, since ids index the
    /// action tables.
    pub fn load(driver: &dyn GestureDriver) -> Result<Self, DriverError> {
        let mut gestures: Vec<Gesture> = Vec::new();
        for gesture in driver.list_supported_gestures()? {
            if gestures.iter().any(|g| g.id == gesture.id) {
                tracing::warn!(
                    id = gesture.id,
                    name = %gesture.name,
                    "driver reported duplicate gesture id, ignoring"
                );
                continue;
            }
            gestures.push(gesture);
        }

        tracing::info!(count = gestures.len(), "gesture catalog loaded");
        Ok(Self { gestures })
    }

    /// Like [`GestureCatalog::load`], but an unreachable driver yields an
    /// empty catalog, which disables the feature for this session.
    pub fn load_or_empty(driver: &dyn GestureDriver) -> Self {
        Self::load(driver).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "gesture driver unavailable, gestures disabled");
            Self::default()
        })
    }

    pub fn from_gestures(gestures: Vec<Gesture>) -> Self {
        Self { gestures }
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    pub fn get(&self, id: u32) -> Option<&Gesture> {
        self.gestures.iter().find(|g| g.id == id)
    }

    pub fn by_scan_code(&self, scan_code: i32) -> Option<&Gesture> {
        self.gestures.iter().find(|g| g.scan_code == scan_code)
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }
}
