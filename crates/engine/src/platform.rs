//! Platform services the engine talks to.
//!
//! These traits abstract the device-specific services so the dispatch logic
//! stays testable. Production builds bind them to the real system services;
//! [`crate::memory`] provides in-memory stand-ins.

use crate::error::{CameraError, LaunchError, SensorError};
use crate::input::KeyAction;
use gestures_events::EventBusRef;
use gestures_storage::PreferenceStoreRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Direction a camera lens faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LensFacing {
    Front,
    Back,
    External,
}

/// Receives torch state changes from the camera service.
///
/// Called on the camera service's own thread.
pub trait TorchListener: Send + Sync {
    fn on_torch_mode_changed(&self, camera_id: &str, enabled: bool);

    fn on_torch_mode_unavailable(&self, camera_id: &str);
}

pub type TorchListenerRef = Arc<dyn TorchListener>;

pub trait CameraService: Send + Sync {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError>;

    /// Lens direction of one camera, `None` when the camera does not say.
    fn lens_facing(&self, camera_id: &str) -> Result<Option<LensFacing>, CameraError>;

    fn set_torch_mode(&self, camera_id: &str, enabled: bool) -> Result<(), CameraError>;

    fn register_torch_listener(&self, listener: TorchListenerRef);
}

/// A generic intent used to find the user's default app for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Intent {
    pub action: &'static str,
    pub data: Option<&'static str>,
}

impl Intent {
    pub const ACTION_VIEW: &'static str = "android.intent.action.VIEW";
    pub const ACTION_DIAL: &'static str = "android.intent.action.DIAL";

    pub const fn view(data: &'static str) -> Self {
        Self {
            action: Self::ACTION_VIEW,
            data: Some(data),
        }
    }

    pub const fn dial() -> Self {
        Self {
            action: Self::ACTION_DIAL,
            data: None,
        }
    }
}

/// Flags applied to a launched activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchFlags {
    pub new_task: bool,
    pub single_top: bool,
    pub clear_top: bool,
}

impl LaunchFlags {
    /// Bring the app to the front in its own task, reusing an existing top
    /// activity.
    pub const GESTURE: LaunchFlags = LaunchFlags {
        new_task: true,
        single_top: true,
        clear_top: true,
    };
}

pub trait ActivityLauncher: Send + Sync {
    /// Package of the first activity able to handle `intent`.
    fn resolve_handler(&self, intent: &Intent) -> Option<String>;

    /// Start the launch activity of `package` for the current user.
    fn start_launch_activity(&self, package: &str, flags: LaunchFlags) -> Result<(), LaunchError>;
}

/// Media transport keys a gesture can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKey {
    PlayPause,
    Previous,
    Next,
}

impl MediaKey {
    /// Platform key code.
    pub fn key_code(self) -> i32 {
        match self {
            MediaKey::PlayPause => 85,
            MediaKey::Next => 87,
            MediaKey::Previous => 88,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaKeyEvent {
    pub key: MediaKey,
    pub action: KeyAction,
}

pub trait MediaButtonSink: Send + Sync {
    fn send_media_button_event(&self, event: MediaKeyEvent);
}

pub trait MediaSessions: Send + Sync {
    /// Helper routing media keys to the active session, if one exists yet.
    fn session_helper(&self) -> Option<Arc<dyn MediaButtonSink>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingerMode {
    Silent,
    Vibrate,
    #[default]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStream {
    Music,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDirection {
    Lower,
    Raise,
}

pub trait AudioService: Send + Sync {
    fn ringer_mode(&self) -> RingerMode;

    /// Move `stream` one step in `direction`.
    fn adjust_stream_volume(&self, stream: AudioStream, direction: VolumeDirection);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationEffect {
    DoubleClick,
    HeavyClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationUsage {
    HardwareFeedback,
}

pub trait Vibrator: Send + Sync {
    fn vibrate(&self, effect: VibrationEffect, usage: VibrationUsage);
}

/// A partial wake lock. Timed acquisitions expire on their own.
pub trait WakeLock: Send + Sync {
    fn acquire_for(&self, timeout: Duration);

    fn release(&self);

    fn is_held(&self) -> bool;
}

pub type WakeLockRef = Arc<dyn WakeLock>;

pub trait PowerService: Send + Sync {
    fn new_wake_lock(&self, tag: &str) -> WakeLockRef;

    /// Turn the display on.
    fn wake_up(&self, reason: &str);
}

/// Callback receiving proximity distances, in centimetres.
pub type ProximityListener = Arc<dyn Fn(f32) + Send + Sync + 'static>;

/// Sampling rate requested for a sensor subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingRate {
    Fastest,
    Normal,
}

/// Live sensor subscription; dropping it without `unregister` leaks it.
pub trait SensorRegistration: Send {
    fn unregister(self: Box<Self>);
}

pub trait ProximitySensor: Send + Sync {
    /// Largest distance the sensor reports; readings at this value mean
    /// "nothing in front of the screen".
    fn maximum_range(&self) -> f32;

    fn register_listener(
        &self,
        listener: ProximityListener,
        rate: SamplingRate,
    ) -> Result<Box<dyn SensorRegistration>, SensorError>;
}

pub trait SetupState: Send + Sync {
    /// The user finished first-boot setup.
    fn is_user_setup_complete(&self) -> bool;
}

/// Every platform service one engine instance needs.
#[derive(Clone)]
pub struct Services {
    pub camera: Arc<dyn CameraService>,
    pub launcher: Arc<dyn ActivityLauncher>,
    pub media: Arc<dyn MediaSessions>,
    pub audio: Arc<dyn AudioService>,
    pub vibrator: Arc<dyn Vibrator>,
    pub power: Arc<dyn PowerService>,
    /// `None` on devices without a proximity sensor.
    pub proximity: Option<Arc<dyn ProximitySensor>>,
    pub setup: Arc<dyn SetupState>,
    pub preferences: PreferenceStoreRef,
    pub events: EventBusRef,
}
