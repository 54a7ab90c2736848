//! In-memory platform services.
//!
//! Each fake records what the engine asked of it so tests (and the headless
//! daemon) can observe the effects of a gesture.

use crate::error::{CameraError, LaunchError, SensorError};
use crate::platform::{
    ActivityLauncher, AudioService, AudioStream, CameraService, Intent, LaunchFlags, LensFacing,
    MediaButtonSink, MediaKeyEvent, MediaSessions, PowerService, ProximityListener,
    ProximitySensor, RingerMode, SamplingRate, SensorRegistration, Services, SetupState,
    TorchListenerRef, VibrationEffect, VibrationUsage, Vibrator, VolumeDirection, WakeLock,
    WakeLockRef,
};
use gestures_events::EventBusRef;
use gestures_storage::PreferenceStoreRef;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Camera service with a fixed set of cameras.
///
/// A successful `set_torch_mode` notifies registered listeners, like the
/// real service does.
#[derive(Default)]
pub struct InMemoryCamera {
    cameras: Vec<(String, Option<LensFacing>)>,
    torch: Mutex<HashMap<String, bool>>,
    failure: Mutex<Option<CameraError>>,
    torch_failure: Mutex<Option<CameraError>>,
    listeners: Mutex<Vec<TorchListenerRef>>,
    torch_calls: Mutex<Vec<(String, bool)>>,
}

impl InMemoryCamera {
    pub fn new(cameras: Vec<(String, Option<LensFacing>)>) -> Self {
        Self {
            cameras,
            ..Self::default()
        }
    }

    /// A front camera "0" and a rear camera "1".
    pub fn phone() -> Self {
        Self::new(vec![
            ("0".to_string(), Some(LensFacing::Front)),
            ("1".to_string(), Some(LensFacing::Back)),
        ])
    }

    /// Make every call fail with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<CameraError>) {
        *self.failure.lock().unwrap() = error;
    }

    /// Make only torch calls fail, leaving camera lookup working.
    pub fn fail_torch_with(&self, error: Option<CameraError>) {
        *self.torch_failure.lock().unwrap() = error;
    }

    pub fn torch_enabled(&self, camera_id: &str) -> bool {
        self.torch
            .lock()
            .unwrap()
            .get(camera_id)
            .copied()
            .unwrap_or(false)
    }

    /// Every successful `(camera_id, enabled)` torch call, in order.
    pub fn torch_calls(&self) -> Vec<(String, bool)> {
        self.torch_calls.lock().unwrap().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Report a torch change made by someone else (quick settings tile).
    pub fn simulate_torch_changed(&self, camera_id: &str, enabled: bool) {
        self.torch
            .lock()
            .unwrap()
            .insert(camera_id.to_string(), enabled);
        for listener in self.listeners() {
            listener.on_torch_mode_changed(camera_id, enabled);
        }
    }

    /// Report that the torch can't be used (camera opened by an app).
    pub fn simulate_torch_unavailable(&self, camera_id: &str) {
        for listener in self.listeners() {
            listener.on_torch_mode_unavailable(camera_id);
        }
    }

    fn listeners(&self) -> Vec<TorchListenerRef> {
        self.listeners.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CameraError> {
        match self.failure.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl CameraService for InMemoryCamera {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        self.check()?;
        Ok(self.cameras.iter().map(|(id, _)| id.clone()).collect())
    }

    fn lens_facing(&self, camera_id: &str) -> Result<Option<LensFacing>, CameraError> {
        self.check()?;
        self.cameras
            .iter()
            .find(|(id, _)| id == camera_id)
            .map(|(_, facing)| *facing)
            .ok_or_else(|| CameraError::Service(format!("unknown camera {camera_id}")))
    }

    fn set_torch_mode(&self, camera_id: &str, enabled: bool) -> Result<(), CameraError> {
        self.check()?;
        if let Some(e) = self.torch_failure.lock().unwrap().clone() {
            return Err(e);
        }
        self.torch
            .lock()
            .unwrap()
            .insert(camera_id.to_string(), enabled);
        self.torch_calls
            .lock()
            .unwrap()
            .push((camera_id.to_string(), enabled));
        for listener in self.listeners() {
            listener.on_torch_mode_changed(camera_id, enabled);
        }
        Ok(())
    }

    fn register_torch_listener(&self, listener: TorchListenerRef) {
        self.listeners.lock().unwrap().push(listener);
    }
}

/// Launcher resolving intents from a fixed handler table.
#[derive(Default)]
pub struct RecordingLauncher {
    handlers: Mutex<HashMap<Intent, String>>,
    launchable: Mutex<HashSet<String>>,
    started: Mutex<Vec<(String, LaunchFlags)>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `package` the default handler for `intent`, with a launch
    /// activity.
    pub fn with_handler(self, intent: Intent, package: &str) -> Self {
        self.handlers
            .lock()
            .unwrap()
            .insert(intent, package.to_string());
        self.launchable.lock().unwrap().insert(package.to_string());
        self
    }

    /// Handler that resolves but has no launch activity.
    pub fn with_headless_handler(self, intent: Intent, package: &str) -> Self {
        self.handlers
            .lock()
            .unwrap()
            .insert(intent, package.to_string());
        self
    }

    pub fn started(&self) -> Vec<(String, LaunchFlags)> {
        self.started.lock().unwrap().clone()
    }
}

impl ActivityLauncher for RecordingLauncher {
    fn resolve_handler(&self, intent: &Intent) -> Option<String> {
        self.handlers.lock().unwrap().get(intent).cloned()
    }

    fn start_launch_activity(&self, package: &str, flags: LaunchFlags) -> Result<(), LaunchError> {
        if !self.launchable.lock().unwrap().contains(package) {
            return Err(LaunchError::ActivityNotFound(package.to_string()));
        }
        self.started
            .lock()
            .unwrap()
            .push((package.to_string(), flags));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMediaSink {
    events: Mutex<Vec<MediaKeyEvent>>,
}

impl RecordingMediaSink {
    pub fn events(&self) -> Vec<MediaKeyEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl MediaButtonSink for RecordingMediaSink {
    fn send_media_button_event(&self, event: MediaKeyEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Media sessions whose helper can be withdrawn to simulate early boot.
pub struct InMemoryMediaSessions {
    sink: Arc<RecordingMediaSink>,
    available: AtomicBool,
}

impl Default for InMemoryMediaSessions {
    fn default() -> Self {
        Self {
            sink: Arc::new(RecordingMediaSink::default()),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryMediaSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn sink(&self) -> &RecordingMediaSink {
        &self.sink
    }
}

impl MediaSessions for InMemoryMediaSessions {
    fn session_helper(&self) -> Option<Arc<dyn MediaButtonSink>> {
        if self.available.load(Ordering::SeqCst) {
            Some(self.sink.clone())
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct InMemoryAudio {
    ringer: Mutex<RingerMode>,
    adjustments: Mutex<Vec<(AudioStream, VolumeDirection)>>,
}

impl InMemoryAudio {
    pub fn new(ringer: RingerMode) -> Self {
        Self {
            ringer: Mutex::new(ringer),
            ..Self::default()
        }
    }

    pub fn set_ringer_mode(&self, mode: RingerMode) {
        *self.ringer.lock().unwrap() = mode;
    }

    pub fn adjustments(&self) -> Vec<(AudioStream, VolumeDirection)> {
        self.adjustments.lock().unwrap().clone()
    }
}

impl AudioService for InMemoryAudio {
    fn ringer_mode(&self) -> RingerMode {
        *self.ringer.lock().unwrap()
    }

    fn adjust_stream_volume(&self, stream: AudioStream, direction: VolumeDirection) {
        self.adjustments.lock().unwrap().push((stream, direction));
    }
}

#[derive(Default)]
pub struct RecordingVibrator {
    effects: Mutex<Vec<(VibrationEffect, VibrationUsage)>>,
}

impl RecordingVibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> Vec<(VibrationEffect, VibrationUsage)> {
        self.effects.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.effects.lock().unwrap().len()
    }
}

impl Vibrator for RecordingVibrator {
    fn vibrate(&self, effect: VibrationEffect, usage: VibrationUsage) {
        self.effects.lock().unwrap().push((effect, usage));
    }
}

/// Wake lock that expires on the tokio clock, so paused-time tests see
/// timed acquisitions run out.
#[derive(Default)]
pub struct InMemoryWakeLock {
    held_until: Mutex<Option<Instant>>,
    acquisitions: Mutex<Vec<Duration>>,
    releases: AtomicUsize,
}

impl InMemoryWakeLock {
    pub fn acquisitions(&self) -> Vec<Duration> {
        self.acquisitions.lock().unwrap().clone()
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl WakeLock for InMemoryWakeLock {
    fn acquire_for(&self, timeout: Duration) {
        *self.held_until.lock().unwrap() = Some(Instant::now() + timeout);
        self.acquisitions.lock().unwrap().push(timeout);
    }

    fn release(&self) {
        *self.held_until.lock().unwrap() = None;
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn is_held(&self) -> bool {
        matches!(*self.held_until.lock().unwrap(), Some(until) if Instant::now() < until)
    }
}

/// Power service handing out one shared lock per tag.
#[derive(Default)]
pub struct InMemoryPower {
    locks: Mutex<HashMap<String, Arc<InMemoryWakeLock>>>,
    wake_ups: Mutex<Vec<String>>,
}

impl InMemoryPower {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock created for `tag`, if the engine asked for one.
    pub fn lock(&self, tag: &str) -> Option<Arc<InMemoryWakeLock>> {
        self.locks.lock().unwrap().get(tag).cloned()
    }

    pub fn wake_ups(&self) -> Vec<String> {
        self.wake_ups.lock().unwrap().clone()
    }
}

impl PowerService for InMemoryPower {
    fn new_wake_lock(&self, tag: &str) -> WakeLockRef {
        self.locks
            .lock()
            .unwrap()
            .entry(tag.to_string())
            .or_default()
            .clone()
    }

    fn wake_up(&self, reason: &str) {
        self.wake_ups.lock().unwrap().push(reason.to_string());
    }
}

#[derive(Default)]
struct SensorListeners {
    next_id: u64,
    active: HashMap<u64, ProximityListener>,
    registrations: usize,
    rates: Vec<SamplingRate>,
}

/// Proximity sensor driven by hand with [`ManualProximitySensor::emit`].
pub struct ManualProximitySensor {
    maximum_range: f32,
    listeners: Arc<Mutex<SensorListeners>>,
    fail_registration: AtomicBool,
}

impl ManualProximitySensor {
    pub fn new(maximum_range: f32) -> Self {
        Self {
            maximum_range,
            listeners: Arc::new(Mutex::new(SensorListeners::default())),
            fail_registration: AtomicBool::new(false),
        }
    }

    /// Deliver a reading to every registered listener.
    pub fn emit(&self, distance: f32) {
        let listeners: Vec<ProximityListener> = self
            .listeners
            .lock()
            .unwrap()
            .active
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(distance);
        }
    }

    pub fn emit_far(&self) {
        self.emit(self.maximum_range);
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.lock().unwrap().active.len()
    }

    /// Total registrations ever made.
    pub fn registrations(&self) -> usize {
        self.listeners.lock().unwrap().registrations
    }

    pub fn requested_rates(&self) -> Vec<SamplingRate> {
        self.listeners.lock().unwrap().rates.clone()
    }

    pub fn set_fail_registration(&self, fail: bool) {
        self.fail_registration.store(fail, Ordering::SeqCst);
    }
}

struct ManualRegistration {
    id: u64,
    listeners: Arc<Mutex<SensorListeners>>,
}

impl SensorRegistration for ManualRegistration {
    fn unregister(self: Box<Self>) {
        self.listeners.lock().unwrap().active.remove(&self.id);
    }
}

impl ProximitySensor for ManualProximitySensor {
    fn maximum_range(&self) -> f32 {
        self.maximum_range
    }

    fn register_listener(
        &self,
        listener: ProximityListener,
        rate: SamplingRate,
    ) -> Result<Box<dyn SensorRegistration>, SensorError> {
        if self.fail_registration.load(Ordering::SeqCst) {
            return Err(SensorError::RegistrationFailed(
                "sensor service unavailable".to_string(),
            ));
        }

        let mut state = self.listeners.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.active.insert(id, listener);
        state.registrations += 1;
        state.rates.push(rate);
        Ok(Box::new(ManualRegistration {
            id,
            listeners: self.listeners.clone(),
        }))
    }
}

pub struct FixedSetupState(AtomicBool);

impl FixedSetupState {
    pub fn new(complete: bool) -> Self {
        Self(AtomicBool::new(complete))
    }

    pub fn set_complete(&self, complete: bool) {
        self.0.store(complete, Ordering::SeqCst);
    }
}

impl SetupState for FixedSetupState {
    fn is_user_setup_complete(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A complete simulated device.
///
/// Keeps typed handles to every fake so callers can inspect them after
/// handing [`InMemoryPlatform::services`] to an engine.
pub struct InMemoryPlatform {
    pub camera: Arc<InMemoryCamera>,
    pub launcher: Arc<RecordingLauncher>,
    pub media: Arc<InMemoryMediaSessions>,
    pub audio: Arc<InMemoryAudio>,
    pub vibrator: Arc<RecordingVibrator>,
    pub power: Arc<InMemoryPower>,
    pub proximity: Option<Arc<ManualProximitySensor>>,
    pub setup: Arc<FixedSetupState>,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self {
            camera: Arc::new(InMemoryCamera::phone()),
            launcher: Arc::new(default_launcher()),
            media: Arc::new(InMemoryMediaSessions::new()),
            audio: Arc::new(InMemoryAudio::new(RingerMode::Normal)),
            vibrator: Arc::new(RecordingVibrator::new()),
            power: Arc::new(InMemoryPower::new()),
            proximity: Some(Arc::new(ManualProximitySensor::new(5.0))),
            setup: Arc::new(FixedSetupState::new(true)),
        }
    }
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_proximity(mut self) -> Self {
        self.proximity = None;
        self
    }

    pub fn services(&self, preferences: PreferenceStoreRef, events: EventBusRef) -> Services {
        Services {
            camera: self.camera.clone(),
            launcher: self.launcher.clone(),
            media: self.media.clone(),
            audio: self.audio.clone(),
            vibrator: self.vibrator.clone(),
            power: self.power.clone(),
            proximity: self
                .proximity
                .clone()
                .map(|sensor| sensor as Arc<dyn ProximitySensor>),
            setup: self.setup.clone(),
            preferences,
            events,
        }
    }
}

fn default_launcher() -> RecordingLauncher {
    RecordingLauncher::new()
        .with_handler(Intent::view("http:"), "org.lineageos.jelly")
        .with_handler(Intent::dial(), "com.android.dialer")
        .with_handler(Intent::view("mailto:"), "com.android.email")
        .with_handler(Intent::view("sms:"), "com.android.messaging")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_sensor_unregister_removes_listener() {
        let sensor = ManualProximitySensor::new(5.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let registration = sensor
            .register_listener(
                Arc::new(move |d: f32| sink.lock().unwrap().push(d)),
                SamplingRate::Fastest,
            )
            .unwrap();

        sensor.emit(1.0);
        registration.unregister();
        sensor.emit(5.0);

        assert_eq!(*seen.lock().unwrap(), vec![1.0]);
        assert_eq!(sensor.active_listeners(), 0);
        assert_eq!(sensor.registrations(), 1);
    }

    #[test]
    fn test_wake_lock_release() {
        let power = InMemoryPower::new();
        let lock = power.new_wake_lock("test");
        lock.acquire_for(Duration::from_secs(60));
        assert!(lock.is_held());

        lock.release();
        assert!(!lock.is_held());
        assert_eq!(power.lock("test").unwrap().release_count(), 1);
    }

    #[test]
    fn test_headless_handler_cannot_launch() {
        let launcher = RecordingLauncher::new().with_headless_handler(Intent::dial(), "com.x");
        assert_eq!(
            launcher.resolve_handler(&Intent::dial()),
            Some("com.x".to_string())
        );
        assert!(matches!(
            launcher.start_launch_activity("com.x", LaunchFlags::GESTURE),
            Err(LaunchError::ActivityNotFound(_))
        ));
    }
}
