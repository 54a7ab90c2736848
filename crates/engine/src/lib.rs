//! Screen-off gesture dispatch engine.
//!
//! Receives key events tagged with gesture scan codes, looks up the bound
//! action, optionally waits for the proximity sensor to report an uncovered
//! screen, and performs the action with haptic confirmation.
//!
//! ```text
//! KeyEvent -> GestureHandler -> ActionMap
//!                 |
//!                 v  (queue)
//!            dispatcher task -> ProximityGate -> ActionExecutor -> haptics
//! ```

pub mod action_map;
pub mod config;
pub mod config_sync;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod haptics;
pub mod input;
pub mod memory;
pub mod platform;
pub mod proximity;
pub mod torch;

pub use action_map::{ActionMap, Resolution};
pub use config::EngineConfig;
pub use config_sync::ConfigSync;
pub use dispatcher::GestureHandler;
pub use error::{CameraError, LaunchError, SensorError};
pub use executor::{ActionExecutor, ActionOutcome};
pub use input::{KeyAction, KeyDisposition, KeyEvent};
pub use platform::Services;
pub use torch::TorchState;
