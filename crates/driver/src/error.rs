//! Error types for the gesture driver boundary.

use thiserror::Error;

/// Errors that can occur while talking to the gesture driver service.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// The gesture service is not declared or could not be bound.
    #[error("gesture service unavailable: {0}")]
    Unavailable(String),

    /// A call reached the service but failed on its side.
    #[error("gesture service call failed: {0}")]
    CallFailed(String),

    /// The service does not know the requested gesture.
    #[error("unknown gesture id {0}")]
    UnknownGesture(u32),
}
