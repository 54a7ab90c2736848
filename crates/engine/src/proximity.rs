//! Proximity check before acting on a gesture.
//!
//! A gesture drawn in a pocket should do nothing. When the check is on, the
//! dispatcher holds a gesture until the sensor reports that nothing covers
//! the screen, or gives up after a short timeout.

use crate::config::EngineConfig;
use crate::error::SensorError;
use crate::platform::{
    ProximityListener, ProximitySensor, SamplingRate, SensorRegistration, Services, WakeLockRef,
};
use gestures_storage::prefs::KEY_PROXIMITY_ON_WAKE;
use gestures_storage::PreferenceStoreRef;
use std::sync::Arc;
use std::time::Duration;

const WAKE_LOCK_TAG: &str = "gestures:ProximityWakeLock";

pub struct ProximityGate {
    sensor: Option<Arc<dyn ProximitySensor>>,
    preferences: PreferenceStoreRef,
    check_on_wake: bool,
    enabled_by_default: bool,
    timeout: Duration,
    wake_lock: WakeLockRef,
}

impl ProximityGate {
    pub fn new(services: &Services, config: &EngineConfig) -> Self {
        Self {
            sensor: services.proximity.clone(),
            preferences: services.preferences.clone(),
            check_on_wake: config.proximity_check_on_wake,
            enabled_by_default: config.proximity_check_enabled_by_default,
            timeout: config.proximity_timeout(),
            wake_lock: services.power.new_wake_lock(WAKE_LOCK_TAG),
        }
    }

    /// Sensor present, device capable and the user preference on.
    ///
    /// Read on every gesture so a preference change applies immediately.
    pub fn is_enabled(&self) -> bool {
        self.check_on_wake
            && self.sensor.is_some()
            && self
                .preferences
                .get_bool(KEY_PROXIMITY_ON_WAKE, self.enabled_by_default)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn maximum_range(&self) -> Option<f32> {
        self.sensor.as_ref().map(|s| s.maximum_range())
    }

    /// A reading at or beyond the sensor's range means nothing is in front
    /// of the screen.
    pub fn is_far(distance: f32, maximum_range: f32) -> bool {
        distance >= maximum_range
    }

    /// Take the wake lock and subscribe `listener` at the fastest rate.
    ///
    /// The returned guard owns both; they go away together.
    pub fn begin(&self, listener: ProximityListener) -> Result<ProximityWait, SensorError> {
        let Some(sensor) = &self.sensor else {
            return Err(SensorError::RegistrationFailed(
                "no proximity sensor".to_string(),
            ));
        };

        self.wake_lock.acquire_for(self.timeout * 2);
        match sensor.register_listener(listener, SamplingRate::Fastest) {
            Ok(registration) => Ok(ProximityWait {
                registration: Some(registration),
                wake_lock: self.wake_lock.clone(),
            }),
            Err(e) => {
                self.wake_lock.release();
                Err(e)
            }
        }
    }
}

/// An in-progress proximity wait.
///
/// Finishing or dropping it unregisters the sensor listener and releases
/// the wake lock.
pub struct ProximityWait {
    registration: Option<Box<dyn SensorRegistration>>,
    wake_lock: WakeLockRef,
}

impl ProximityWait {
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.unregister();
            if self.wake_lock.is_held() {
                self.wake_lock.release();
            }
        }
    }
}

impl Drop for ProximityWait {
    fn drop(&mut self) {
        self.release();
    }
}
