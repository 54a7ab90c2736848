//! Performs the action bound to a gesture.

use crate::config::EngineConfig;
use crate::haptics::HapticFeedback;
use crate::input::KeyAction;
use crate::platform::{
    ActivityLauncher, AudioService, AudioStream, CameraService, Intent, LaunchFlags, MediaKey,
    MediaKeyEvent, MediaSessions, PowerService, Services, VolumeDirection, WakeLockRef,
};
use crate::torch::{find_rear_camera, TorchState};
use gestures_events::{event_names, ActionCode, CameraGestureEvent, EventBusRef};
use std::sync::Arc;
use std::time::Duration;

const WAKE_LOCK_TAG: &str = "gestures:GestureWakeLock";

/// Wake-up reason reported when a gesture turns the display on.
pub const WAKE_REASON_GESTURE: &str = "gesture";

/// What happened to one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Performed,
    /// Nothing to do: no handler, no media session, no rear camera.
    Skipped,
    /// The platform refused; the user sees nothing.
    Failed,
}

pub struct ActionExecutor {
    camera: Arc<dyn CameraService>,
    launcher: Arc<dyn ActivityLauncher>,
    media: Arc<dyn MediaSessions>,
    audio: Arc<dyn AudioService>,
    power: Arc<dyn PowerService>,
    events: EventBusRef,
    haptics: HapticFeedback,
    wake_lock: WakeLockRef,
    wake_lock_duration: Duration,
    torch: TorchState,
}

impl ActionExecutor {
    pub fn new(services: &Services, config: &EngineConfig) -> Self {
        Self {
            camera: services.camera.clone(),
            launcher: services.launcher.clone(),
            media: services.media.clone(),
            audio: services.audio.clone(),
            power: services.power.clone(),
            events: services.events.clone(),
            haptics: HapticFeedback::new(services),
            wake_lock: services.power.new_wake_lock(WAKE_LOCK_TAG),
            wake_lock_duration: config.gesture_wake_lock_duration(),
            torch: TorchState::default(),
        }
    }

    pub fn torch_state(&self) -> TorchState {
        self.torch
    }

    /// Run `action`, vibrating on success.
    pub fn execute(&mut self, action: ActionCode) -> ActionOutcome {
        let outcome = match action {
            ActionCode::None => ActionOutcome::Skipped,
            ActionCode::Flashlight => self.toggle_flashlight(),
            ActionCode::Camera => self.launch_camera(),
            ActionCode::Browser => self.launch_default_app(Intent::view("http:")),
            ActionCode::Dialer => self.launch_default_app(Intent::dial()),
            ActionCode::Email => self.launch_default_app(Intent::view("mailto:")),
            ActionCode::Messages => self.launch_default_app(Intent::view("sms:")),
            ActionCode::PlayPause => self.send_media_key(MediaKey::PlayPause),
            ActionCode::PreviousTrack => self.send_media_key(MediaKey::Previous),
            ActionCode::NextTrack => self.send_media_key(MediaKey::Next),
            ActionCode::VolumeDown => self.adjust_volume(VolumeDirection::Lower),
            ActionCode::VolumeUp => self.adjust_volume(VolumeDirection::Raise),
        };

        if outcome == ActionOutcome::Performed {
            self.haptics.perform();
        }
        tracing::debug!(action = %action, ?outcome, "gesture action finished");
        outcome
    }

    pub fn on_torch_mode_changed(&mut self, camera_id: &str, enabled: bool) {
        if self.is_rear_camera(camera_id) {
            self.torch.set(enabled);
        }
    }

    pub fn on_torch_mode_unavailable(&mut self, camera_id: &str) {
        if self.is_rear_camera(camera_id) {
            self.torch.set(false);
        }
    }

    fn is_rear_camera(&self, camera_id: &str) -> bool {
        find_rear_camera(self.camera.as_ref()).as_deref() == Some(camera_id)
    }

    fn hold_wake_lock(&self) {
        self.wake_lock.acquire_for(self.wake_lock_duration);
    }

    fn launch_camera(&mut self) -> ActionOutcome {
        self.hold_wake_lock();
        let event = CameraGestureEvent::for_current_user();
        match serde_json::to_value(&event) {
            Ok(payload) => {
                self.events
                    .emit(event_names::SCREEN_CAMERA_GESTURE, payload);
                ActionOutcome::Performed
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to encode camera gesture event");
                ActionOutcome::Failed
            }
        }
    }

    fn toggle_flashlight(&mut self) -> ActionOutcome {
        let Some(camera_id) = find_rear_camera(self.camera.as_ref()) else {
            tracing::debug!("no rear camera, flashlight gesture ignored");
            return ActionOutcome::Skipped;
        };

        self.hold_wake_lock();
        let enabled = !self.torch.is_enabled();
        match self.camera.set_torch_mode(&camera_id, enabled) {
            Ok(()) => {
                self.torch.set(enabled);
                ActionOutcome::Performed
            }
            Err(e) => {
                tracing::debug!(camera = %camera_id, error = %e, "torch toggle failed");
                ActionOutcome::Failed
            }
        }
    }

    fn launch_default_app(&mut self, intent: Intent) -> ActionOutcome {
        self.hold_wake_lock();
        self.power.wake_up(WAKE_REASON_GESTURE);

        let Some(package) = self.launcher.resolve_handler(&intent) else {
            tracing::debug!(action = intent.action, data = ?intent.data, "no handler for intent");
            return ActionOutcome::Skipped;
        };

        match self
            .launcher
            .start_launch_activity(&package, LaunchFlags::GESTURE)
        {
            Ok(()) => ActionOutcome::Performed,
            Err(e) => {
                tracing::debug!(package = %package, error = %e, "default app not launched");
                ActionOutcome::Skipped
            }
        }
    }

    fn send_media_key(&mut self, key: MediaKey) -> ActionOutcome {
        let Some(helper) = self.media.session_helper() else {
            tracing::warn!(key_code = key.key_code(), "unable to send media key event");
            return ActionOutcome::Skipped;
        };

        self.hold_wake_lock();
        for action in [KeyAction::Down, KeyAction::Up] {
            helper.send_media_button_event(MediaKeyEvent { key, action });
        }
        ActionOutcome::Performed
    }

    fn adjust_volume(&mut self, direction: VolumeDirection) -> ActionOutcome {
        self.hold_wake_lock();
        self.audio
            .adjust_stream_volume(AudioStream::Music, direction);
        ActionOutcome::Performed
    }
}
