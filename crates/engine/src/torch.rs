//! Rear camera flash tracking.

use crate::dispatcher::{DispatchMessage, WeakDispatchSender};
use crate::platform::{CameraService, LensFacing, TorchListener};

/// Last known state of the rear camera flash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TorchState {
    enabled: bool,
}

impl TorchState {
    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    pub(crate) fn set(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// First camera whose lens faces back.
///
/// Any camera service error counts as "no rear camera".
pub fn find_rear_camera(camera: &dyn CameraService) -> Option<String> {
    let ids = match camera.camera_ids() {
        Ok(ids) => ids,
        Err(e) => {
            tracing::debug!(error = %e, "camera list unavailable");
            return None;
        }
    };

    for id in ids {
        match camera.lens_facing(&id) {
            Ok(Some(LensFacing::Back)) => return Some(id),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(camera = %id, error = %e, "camera characteristics unavailable");
                return None;
            }
        }
    }
    None
}

/// Forwards camera service callbacks onto the dispatcher queue.
///
/// Holds a weak sender so a registered callback doesn't keep a stopped
/// engine alive.
pub(crate) struct TorchCallback {
    tx: WeakDispatchSender,
}

impl TorchCallback {
    pub(crate) fn new(tx: WeakDispatchSender) -> Self {
        Self { tx }
    }

    fn post(&self, message: DispatchMessage) {
        if let Some(tx) = self.tx.upgrade() {
            let _ = tx.send(message);
        }
    }
}

impl TorchListener for TorchCallback {
    fn on_torch_mode_changed(&self, camera_id: &str, enabled: bool) {
        self.post(DispatchMessage::TorchChanged {
            camera_id: camera_id.to_string(),
            enabled,
        });
    }

    fn on_torch_mode_unavailable(&self, camera_id: &str) {
        self.post(DispatchMessage::TorchUnavailable {
            camera_id: camera_id.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CameraError;
    use crate::memory::InMemoryCamera;

    #[test]
    fn test_first_back_camera_wins() {
        let camera = InMemoryCamera::new(vec![
            ("0".to_string(), Some(LensFacing::Front)),
            ("2".to_string(), None),
            ("3".to_string(), Some(LensFacing::Back)),
            ("4".to_string(), Some(LensFacing::Back)),
        ]);
        assert_eq!(find_rear_camera(&camera), Some("3".to_string()));
    }

    #[test]
    fn test_no_back_camera() {
        let camera = InMemoryCamera::new(vec![("0".to_string(), Some(LensFacing::Front))]);
        assert_eq!(find_rear_camera(&camera), None);
    }

    #[test]
    fn test_camera_error_means_no_camera() {
        let camera = InMemoryCamera::phone();
        camera.fail_with(Some(CameraError::AccessDenied("policy".to_string())));
        assert_eq!(find_rear_camera(&camera), None);
    }
}
