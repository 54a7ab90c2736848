//! Simulated device: in-memory platform, driver and preferences wired to
//! one in-process event bus.

use crate::config::DaemonConfig;
use anyhow::Context;
use gestures_driver::InMemoryDriver;
use gestures_engine::memory::{
    FixedSetupState, InMemoryAudio, InMemoryPlatform, ManualProximitySensor,
};
use gestures_engine::Services;
use gestures_events::{event_names, LocalEventBus};
use gestures_storage::{Database, InMemoryPreferences, PreferenceStoreRef};
use std::sync::Arc;

pub struct SimulatedDevice {
    pub platform: InMemoryPlatform,
    pub driver: Arc<InMemoryDriver>,
    pub preferences: PreferenceStoreRef,
    pub bus: Arc<LocalEventBus>,
    pub system_user: bool,
}

impl SimulatedDevice {
    pub fn from_config(config: &DaemonConfig) -> anyhow::Result<Self> {
        let preferences: PreferenceStoreRef = match &config.database_path {
            Some(path) => Arc::new(
                Database::open(path)
                    .with_context(|| format!("opening preferences at {}", path.display()))?,
            ),
            None => Arc::new(InMemoryPreferences::new()),
        };

        let device = &config.device;
        let platform = InMemoryPlatform {
            audio: Arc::new(InMemoryAudio::new(device.ringer_mode)),
            proximity: device
                .has_proximity_sensor
                .then(|| Arc::new(ManualProximitySensor::new(device.proximity_max_range))),
            setup: Arc::new(FixedSetupState::new(device.setup_complete)),
            ..InMemoryPlatform::new()
        };

        let bus = Arc::new(LocalEventBus::new());
        bus.subscribe(
            event_names::SCREEN_CAMERA_GESTURE,
            Arc::new(|payload: &serde_json::Value| {
                tracing::info!(payload = %payload, "camera gesture broadcast");
            }),
        );

        Ok(Self {
            platform,
            driver: Arc::new(InMemoryDriver::new(config.gestures.clone())),
            preferences,
            bus,
            system_user: device.system_user,
        })
    }

    pub fn services(&self) -> Services {
        self.platform
            .services(self.preferences.clone(), self.bus.clone())
    }
}
