use thiserror::Error;

/// Failures reported by the camera service.
///
/// None of these reach the user; a failed torch toggle is a silent no-op.
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    AccessDenied(String),

    #[error("camera {0} disconnected")]
    Disconnected(String),

    #[error("camera service error: {0}")]
    Service(String),
}

#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    #[error("no launchable activity in package {0}")]
    ActivityNotFound(String),

    #[error("activity start failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Error)]
pub enum SensorError {
    #[error("proximity listener registration failed: {0}")]
    RegistrationFailed(String),
}
