//! Daemon configuration, loaded from a JSON file.

use anyhow::Context;
use gestures_driver::Gesture;
use gestures_engine::platform::RingerMode;
use gestures_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub engine: EngineConfig,
    /// Gestures the simulated touch controller reports.
    pub gestures: Vec<Gesture>,
    /// SQLite preference database; preferences live in memory when unset.
    pub database_path: Option<PathBuf>,
    pub device: SimulatedDeviceConfig,
}

/// State of the simulated hardware at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedDeviceConfig {
    pub has_proximity_sensor: bool,
    pub proximity_max_range: f32,
    pub ringer_mode: RingerMode,
    pub setup_complete: bool,
    /// Boot restore only runs for the system user.
    pub system_user: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                default_actions: vec![2, 1],
                ..EngineConfig::default()
            },
            gestures: vec![
                Gesture::new(0, "letter_c", 250),
                Gesture::new(1, "letter_v", 251),
                Gesture::new(2, "letter_o", 252),
                Gesture::new(3, "letter_w", 253),
                Gesture::new(4, "arrow_up", 254),
            ],
            database_path: None,
            device: SimulatedDeviceConfig::default(),
        }
    }
}

impl Default for SimulatedDeviceConfig {
    fn default() -> Self {
        Self {
            has_proximity_sensor: true,
            proximity_max_range: 5.0,
            ringer_mode: RingerMode::Normal,
            setup_complete: true,
            system_user: true,
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config from `path`, or the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
