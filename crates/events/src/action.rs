//! Action codes a gesture can be bound to.
//!
//! The numeric values are the wire format: they are persisted in the
//! preference store and carried in update broadcasts, so they must never
//! be renumbered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user-selectable behavior bound to a gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ActionCode {
    /// Gesture is known but disabled by the user.
    #[default]
    None = 0,
    Flashlight = 1,
    Camera = 2,
    Browser = 3,
    Dialer = 4,
    Email = 5,
    Messages = 6,
    PlayPause = 7,
    PreviousTrack = 8,
    NextTrack = 9,
    VolumeDown = 10,
    VolumeUp = 11,
}

/// Error returned when an integer or name is not a known action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture action: {0}")]
pub struct UnknownAction(pub String);

impl ActionCode {
    /// Every action, in wire order. This is also the order of the choices
    /// offered by the settings surface.
    pub const ALL: [ActionCode; 12] = [
        ActionCode::None,
        ActionCode::Flashlight,
        ActionCode::Camera,
        ActionCode::Browser,
        ActionCode::Dialer,
        ActionCode::Email,
        ActionCode::Messages,
        ActionCode::PlayPause,
        ActionCode::PreviousTrack,
        ActionCode::NextTrack,
        ActionCode::VolumeDown,
        ActionCode::VolumeUp,
    ];

    /// Wire value of this action.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up an action by wire value.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.code() == code)
    }

    pub fn is_none(self) -> bool {
        self == ActionCode::None
    }

    /// Stable snake_case name, matching the serde representation.
    pub fn name(self) -> &'static str {
        match self {
            ActionCode::None => "none",
            ActionCode::Flashlight => "flashlight",
            ActionCode::Camera => "camera",
            ActionCode::Browser => "browser",
            ActionCode::Dialer => "dialer",
            ActionCode::Email => "email",
            ActionCode::Messages => "messages",
            ActionCode::PlayPause => "play_pause",
            ActionCode::PreviousTrack => "previous_track",
            ActionCode::NextTrack => "next_track",
            ActionCode::VolumeDown => "volume_down",
            ActionCode::VolumeUp => "volume_up",
        }
    }

    /// Drawable resource shown next to a gesture bound to this action.
    pub fn icon(self) -> &'static str {
        match self {
            ActionCode::None => "ic_gesture_action_none",
            ActionCode::Flashlight => "ic_gesture_action_flashlight",
            ActionCode::Camera => "ic_gesture_action_camera",
            ActionCode::Browser => "ic_gesture_action_browser",
            ActionCode::Dialer => "ic_gesture_action_dialer",
            ActionCode::Email => "ic_gesture_action_email",
            ActionCode::Messages => "ic_gesture_action_messages",
            ActionCode::PlayPause => "ic_gesture_action_play_pause",
            ActionCode::PreviousTrack => "ic_gesture_action_previous_track",
            ActionCode::NextTrack => "ic_gesture_action_next_track",
            ActionCode::VolumeDown => "ic_gesture_action_volume_down",
            ActionCode::VolumeUp => "ic_gesture_action_volume_up",
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for ActionCode {
    type Error = UnknownAction;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| UnknownAction(code.to_string()))
    }
}

/// Accepts either the wire value ("2") or the name ("camera").
impl FromStr for ActionCode {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Self::try_from(code);
        }
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name() == lower)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_are_stable() {
        assert_eq!(ActionCode::None.code(), 0);
        assert_eq!(ActionCode::Camera.code(), 2);
        assert_eq!(ActionCode::VolumeUp.code(), 11);
        for (index, action) in ActionCode::ALL.iter().enumerate() {
            assert_eq!(action.code(), index as i32);
        }
    }

    #[test]
    fn test_from_code_rejects_out_of_range() {
        assert_eq!(ActionCode::from_code(-1), None);
        assert_eq!(ActionCode::from_code(12), None);
        assert!(ActionCode::try_from(99).is_err());
    }

    #[test]
    fn test_parse_name_or_number() {
        assert_eq!("camera".parse::<ActionCode>().unwrap(), ActionCode::Camera);
        assert_eq!("Play_Pause".parse::<ActionCode>().unwrap(), ActionCode::PlayPause);
        assert_eq!("1".parse::<ActionCode>().unwrap(), ActionCode::Flashlight);
        assert!("teleport".parse::<ActionCode>().is_err());
    }

    #[test]
    fn test_serde_matches_name() {
        let json = serde_json::to_string(&ActionCode::NextTrack).unwrap();
        assert_eq!(json, "\"next_track\"");
    }
}
