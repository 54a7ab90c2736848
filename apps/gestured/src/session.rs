//! One running engine plus the settings surface, driven by [`Command`]s.

use crate::commands::{Command, HELP};
use crate::config::DaemonConfig;
use crate::device::SimulatedDevice;
use gestures_engine::{GestureHandler, KeyEvent};
use gestures_settings::{restore_on_boot, GestureSettings, RestoreOutcome};
use std::fmt::Write as _;
use std::time::Duration;

/// What the caller should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Continue(String),
    Quit,
}

pub struct Session {
    device: SimulatedDevice,
    handler: GestureHandler,
    settings: Option<GestureSettings>,
    proximity_default: bool,
}

impl Session {
    /// Boot the simulated device: restore driver state, then start the
    /// engine and subscribe it to binding updates.
    pub fn boot(config: &DaemonConfig) -> anyhow::Result<Self> {
        let device = SimulatedDevice::from_config(config)?;
        let defaults = &config.engine.default_actions;

        match restore_on_boot(
            device.system_user,
            device.driver.as_ref(),
            device.preferences.as_ref(),
            device.bus.as_ref(),
            defaults,
        ) {
            Ok(RestoreOutcome::Restored { gestures, enabled }) => {
                tracing::info!(gestures, enabled, "boot restore complete");
            }
            Ok(RestoreOutcome::NotSystemUser) => {}
            Err(e) => tracing::warn!(error = %e, "boot restore failed, gestures stay disabled"),
        }

        let handler =
            GestureHandler::start(config.engine.clone(), device.services(), device.driver.as_ref());
        handler.config_sync().subscribe(&device.bus);

        let settings = match GestureSettings::load(
            device.driver.clone(),
            device.preferences.clone(),
            device.bus.clone(),
            defaults,
        ) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "gesture settings unavailable");
                None
            }
        };

        Ok(Self {
            device,
            handler,
            settings,
            proximity_default: config.engine.proximity_check_enabled_by_default,
        })
    }

    pub fn handler(&self) -> &GestureHandler {
        &self.handler
    }

    #[cfg(test)]
    pub fn device(&self) -> &SimulatedDevice {
        &self.device
    }

    /// Run one command and wait until the engine has handled its effects.
    pub async fn execute(&self, command: Command) -> Reply {
        let text = match command {
            Command::Tap(scan_code) => {
                let down = self.key(KeyEvent::down(scan_code));
                let up = self.key(KeyEvent::up(scan_code));
                format!("down: {down}, up: {up}")
            }
            Command::Down(scan_code) => self.key(KeyEvent::down(scan_code)).to_string(),
            Command::Up(scan_code) => self.key(KeyEvent::up(scan_code)).to_string(),
            Command::Proximity(distance) => self.emit_proximity(Some(distance)),
            Command::Far => self.emit_proximity(None),
            Command::Near => self.emit_proximity(Some(0.0)),
            Command::Wait(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                format!("waited {ms}ms")
            }
            Command::Bind { gesture, action } => match &self.settings {
                Some(settings) => match settings.select_action(gesture, action) {
                    Ok(()) => format!("gesture {gesture} -> {action}"),
                    Err(e) => format!("error: {e}"),
                },
                None => "error: gesture settings unavailable".to_string(),
            },
            Command::List => self.list(),
            Command::Torch(enabled) => match self.rear_camera() {
                Some(camera_id) => {
                    self.device
                        .platform
                        .camera
                        .simulate_torch_changed(&camera_id, enabled);
                    format!("torch {}", on_off(enabled))
                }
                None => "error: no rear camera".to_string(),
            },
            Command::Ringer(mode) => {
                self.device.platform.audio.set_ringer_mode(mode);
                format!("ringer {mode:?}").to_ascii_lowercase()
            }
            Command::Haptics(enabled) => self.with_settings(|s| {
                s.set_haptic_feedback(enabled)
                    .map(|()| format!("haptics {}", on_off(enabled)))
            }),
            Command::ProximityCheck(enabled) => self.with_settings(|s| {
                s.set_proximity_on_wake(enabled)
                    .map(|()| format!("proximity check {}", on_off(enabled)))
            }),
            Command::Reset => {
                self.handler.reset();
                "reset".to_string()
            }
            Command::Status => {
                self.handler.sync().await;
                return Reply::Continue(self.status());
            }
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.handler.shutdown();
                return Reply::Quit;
            }
        };

        self.handler.sync().await;
        Reply::Continue(text)
    }

    fn key(&self, event: KeyEvent) -> &'static str {
        if self.handler.handle_key_event(&event).is_consumed() {
            "consumed"
        } else {
            "pass-through"
        }
    }

    /// `None` sends a reading at the sensor's maximum range.
    fn emit_proximity(&self, distance: Option<f32>) -> String {
        let Some(sensor) = &self.device.platform.proximity else {
            return "error: no proximity sensor".to_string();
        };
        match distance {
            Some(distance) => {
                sensor.emit(distance);
                format!("proximity {distance}")
            }
            None => {
                sensor.emit_far();
                "proximity far".to_string()
            }
        }
    }

    fn with_settings(
        &self,
        f: impl FnOnce(&GestureSettings) -> gestures_settings::Result<String>,
    ) -> String {
        match &self.settings {
            Some(settings) => f(settings).unwrap_or_else(|e| format!("error: {e}")),
            None => "error: gesture settings unavailable".to_string(),
        }
    }

    fn list(&self) -> String {
        let Some(settings) = &self.settings else {
            return "error: gesture settings unavailable".to_string();
        };
        let mut out = String::new();
        for entry in settings.entries() {
            let _ = writeln!(
                out,
                "{:>2} {:<10} scan {:<4} {} (default {})",
                entry.gesture.id,
                entry.gesture.name,
                entry.gesture.scan_code,
                entry.action,
                entry.default_action
            );
        }
        let _ = write!(
            out,
            "haptics {}, proximity check {}",
            on_off(settings.haptic_feedback()),
            on_off(settings.proximity_on_wake(self.proximity_default))
        );
        out
    }

    fn status(&self) -> String {
        let platform = &self.device.platform;
        let mut bindings: Vec<_> = self
            .handler
            .action_map()
            .snapshot()
            .iter()
            .map(|(scan_code, action)| (*scan_code, *action))
            .collect();
        bindings.sort_unstable_by_key(|(scan_code, _)| *scan_code);

        let mut out = String::new();
        for (scan_code, action) in bindings {
            let _ = writeln!(out, "scan {scan_code:<4} -> {action}");
        }
        let torch = self
            .rear_camera()
            .is_some_and(|id| platform.camera.torch_enabled(&id));
        let _ = write!(
            out,
            "torch {}, launched {}, media keys {}, vibrations {}, running {}",
            on_off(torch),
            platform.launcher.started().len(),
            platform.media.sink().events().len(),
            platform.vibrator.count(),
            self.handler.is_running()
        );
        out
    }

    fn rear_camera(&self) -> Option<String> {
        gestures_engine::torch::find_rear_camera(self.device.platform.camera.as_ref())
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestures_events::ActionCode;

    fn reply_text(reply: Reply) -> String {
        match reply {
            Reply::Continue(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_camera_gesture_waits_for_proximity() {
        let mut config = DaemonConfig::default();
        config.engine.proximity_check_enabled_by_default = true;
        let session = Session::boot(&config).unwrap();

        let text = reply_text(session.execute(Command::Tap(250)).await);
        assert_eq!(text, "down: pass-through, up: consumed");

        let sensor = session.device().platform.proximity.clone().unwrap();
        assert_eq!(sensor.active_listeners(), 1);

        session.execute(Command::Far).await;
        assert_eq!(sensor.active_listeners(), 0);
        assert_eq!(session.device().platform.vibrator.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bind_then_tap_toggles_torch() {
        let session = Session::boot(&DaemonConfig::default()).unwrap();

        let text = reply_text(
            session
                .execute(Command::Bind {
                    gesture: 2,
                    action: ActionCode::Flashlight,
                })
                .await,
        );
        assert_eq!(text, "gesture 2 -> flashlight");
        assert_eq!(session.device().driver.is_enabled(2), Some(true));

        session.execute(Command::Tap(252)).await;
        assert!(session.device().platform.camera.torch_enabled("1"));

        let status = reply_text(session.execute(Command::Status).await);
        assert!(status.contains("scan 252  -> flashlight"));
        assert!(status.contains("torch on"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbound_scan_code_passes_through() {
        let session = Session::boot(&DaemonConfig::default()).unwrap();
        let text = reply_text(session.execute(Command::Up(300)).await);
        assert_eq!(text, "pass-through");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_stops_engine() {
        let session = Session::boot(&DaemonConfig::default()).unwrap();
        assert_eq!(session.execute(Command::Quit).await, Reply::Quit);
        session.handler().sync().await;
        assert!(!session.handler().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_shows_restored_defaults() {
        let session = Session::boot(&DaemonConfig::default()).unwrap();
        let text = reply_text(session.execute(Command::List).await);
        assert!(text.contains("letter_c"));
        assert!(text.contains("camera (default camera)"));
        assert!(text.contains("flashlight (default flashlight)"));
        assert!(text.ends_with("haptics on, proximity check off"));
    }
}
