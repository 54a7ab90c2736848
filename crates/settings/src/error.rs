use gestures_driver::DriverError;
use gestures_events::{ActionCode, UnknownAction};
use gestures_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("unknown gesture id {0}")]
    UnknownGesture(u32),

    /// The driver refused to toggle the gesture; the selection is reverted.
    #[error("driver rejected {action} for gesture {gesture}")]
    Rejected { gesture: u32, action: ActionCode },

    #[error(transparent)]
    UnknownAction(#[from] UnknownAction),

    #[error("failed to encode update: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
