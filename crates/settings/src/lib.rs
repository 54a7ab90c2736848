//! Gesture settings surface and boot-time restore.
//!
//! Both sides produce the same `gestures:update_settings` broadcast the
//! running engine listens to, and both call the driver's enable toggle.

mod broadcast;
mod error;
mod restore;
mod surface;

pub use broadcast::send_update_broadcast;
pub use error::{Result, SettingsError};
pub use restore::{restore_on_boot, RestoreOutcome};
pub use surface::{ActionChoice, GestureEntry, GestureSettings};
