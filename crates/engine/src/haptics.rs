use crate::platform::{AudioService, RingerMode, Services, VibrationEffect, VibrationUsage, Vibrator};
use gestures_storage::prefs::{DEFAULT_HAPTIC_FEEDBACK, KEY_HAPTIC_FEEDBACK};
use gestures_storage::PreferenceStoreRef;
use std::sync::Arc;

/// Effect played for a ringer mode. Silent means no feedback.
pub fn effect_for(mode: RingerMode) -> Option<VibrationEffect> {
    match mode {
        RingerMode::Vibrate => Some(VibrationEffect::DoubleClick),
        RingerMode::Normal => Some(VibrationEffect::HeavyClick),
        RingerMode::Silent => None,
    }
}

/// Confirms a performed gesture with a short vibration.
pub struct HapticFeedback {
    vibrator: Arc<dyn Vibrator>,
    audio: Arc<dyn AudioService>,
    preferences: PreferenceStoreRef,
}

impl HapticFeedback {
    pub fn new(services: &Services) -> Self {
        Self {
            vibrator: services.vibrator.clone(),
            audio: services.audio.clone(),
            preferences: services.preferences.clone(),
        }
    }

    /// Vibrate if the user wants it and the ringer allows it. Returns the
    /// effect played.
    pub fn perform(&self) -> Option<VibrationEffect> {
        if !self
            .preferences
            .get_bool(KEY_HAPTIC_FEEDBACK, DEFAULT_HAPTIC_FEEDBACK)
        {
            return None;
        }

        let effect = effect_for(self.audio.ringer_mode())?;
        self.vibrator.vibrate(effect, VibrationUsage::HardwareFeedback);
        Some(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryPlatform;
    use gestures_events::NullEventBus;
    use gestures_storage::{InMemoryPreferences, PreferenceStore};

    fn setup() -> (InMemoryPlatform, Arc<InMemoryPreferences>, HapticFeedback) {
        let platform = InMemoryPlatform::new();
        let prefs = Arc::new(InMemoryPreferences::new());
        let haptics = HapticFeedback::new(&platform.services(prefs.clone(), Arc::new(NullEventBus)));
        (platform, prefs, haptics)
    }

    #[test]
    fn test_effect_per_ringer_mode() {
        let (platform, _prefs, haptics) = setup();

        platform.audio.set_ringer_mode(RingerMode::Vibrate);
        assert_eq!(haptics.perform(), Some(VibrationEffect::DoubleClick));

        platform.audio.set_ringer_mode(RingerMode::Normal);
        assert_eq!(haptics.perform(), Some(VibrationEffect::HeavyClick));

        platform.audio.set_ringer_mode(RingerMode::Silent);
        assert_eq!(haptics.perform(), None);

        assert_eq!(
            platform.vibrator.effects(),
            vec![
                (VibrationEffect::DoubleClick, VibrationUsage::HardwareFeedback),
                (VibrationEffect::HeavyClick, VibrationUsage::HardwareFeedback),
            ]
        );
    }

    #[test]
    fn test_preference_off_suppresses_feedback() {
        let (platform, prefs, haptics) = setup();
        prefs.put_bool(KEY_HAPTIC_FEEDBACK, false).unwrap();

        platform.audio.set_ringer_mode(RingerMode::Normal);
        assert_eq!(haptics.perform(), None);
        assert_eq!(platform.vibrator.count(), 0);
    }
}
