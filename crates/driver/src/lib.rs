//! Touchscreen gesture driver boundary.
//!
//! The vendor gesture service is a read-mostly capability provider: it lists
//! the gestures the touch controller can classify and accepts per-gesture
//! enable toggles. Everything above it depends only on [`GestureDriver`].
//!
//! # Example
//!
//! ```ignore
//! use gestures_driver::{GestureCatalog, InMemoryDriver, Gesture};
//!
//! let driver = InMemoryDriver::new(vec![Gesture::new(0, "letter_c", 250)]);
//! let catalog = GestureCatalog::load_or_empty(&driver);
//! ```

mod catalog;
mod error;
mod memory;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use catalog::GestureCatalog;
pub use error::DriverError;
pub use memory::InMemoryDriver;

/// A driver-classified screen-off gesture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gesture {
    /// Driver-assigned id, also the index into action tables.
    pub id: u32,
    /// Token used to resolve a localized title.
    pub name: String,
    /// Raw input code the gesture surfaces as.
    pub scan_code: i32,
}

impl Gesture {
    pub fn new(id: u32, name: impl Into<String>, scan_code: i32) -> Self {
        Self {
            id,
            name: name.into(),
            scan_code,
        }
    }

    /// Position of this gesture in id-indexed tables.
    pub fn index(&self) -> usize {
        self.id as usize
    }
}

/// Boundary to the vendor touchscreen gesture service.
pub trait GestureDriver: Send + Sync {
    /// Gestures the touch controller can report.
    fn list_supported_gestures(&self) -> Result<Vec<Gesture>, DriverError>;

    /// Turn recognition of a gesture on or off in the controller.
    ///
    /// `Ok(false)` means the service refused the change.
    fn set_gesture_enabled(&self, gesture: &Gesture, enabled: bool) -> Result<bool, DriverError>;
}

/// Type alias for a shared driver.
pub type GestureDriverRef = Arc<dyn GestureDriver>;
