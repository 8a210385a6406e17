//! Skips audio actions that would not change anything

use super::action::{AudioAction, WebRtcAction};
use super::state::AudioStoreState;
use crate::store::Coordinator;

/// Drops actions whose value is already reflected in the state
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioCoordinator;

impl Coordinator<AudioStoreState, AudioAction> for AudioCoordinator {
    fn should_execute(&self, action: &AudioAction, state: &AudioStoreState) -> bool {
        match action {
            AudioAction::SetActive(value) => state.is_active != *value,
            AudioAction::SetInterrupted(value) => state.is_interrupted != *value,
            AudioAction::SetShouldRecord(value) => state.should_record != *value,
            AudioAction::SetRecording(value) => state.is_recording != *value,
            AudioAction::SetMicrophoneMuted(value) => state.is_microphone_muted != *value,
            AudioAction::SetHasRecordingPermission(value) => state.has_recording_permission != *value,
            AudioAction::SetAudioDeviceModule(module) => state.audio_device_module != *module,
            AudioAction::SetCurrentRoute(route) => state.current_route != *route,
            AudioAction::SetPrefersStereoPlayout(value) => state.stereo.preferred != *value,
            AudioAction::SetStereoPlayoutEnabled(value) => state.stereo.enabled != *value,
            AudioAction::Session(action) => {
                action.apply_to(&state.audio_session_configuration) != state.audio_session_configuration
            }
            AudioAction::WebRtc(action) => {
                let current = &state.webrtc_configuration;
                match *action {
                    WebRtcAction::SetAudioEnabled(value) => current.is_audio_enabled != value,
                    WebRtcAction::SetUseManualAudio(value) => current.use_manual_audio != value,
                    WebRtcAction::SetPrefersNoInterruptionsFromSystemAlerts(value) => {
                        current.prefers_no_interruptions_from_system_alerts != value
                    }
                }
            }
            AudioAction::RequestRecordPermission => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::action::SessionAction;
    use crate::audio::state::{AudioSessionCategory, PortOverride};

    #[test]
    fn test_skips_same_values() {
        let coordinator = AudioCoordinator;
        let state = AudioStoreState::default();

        assert!(!coordinator.should_execute(&AudioAction::SetActive(false), &state));
        assert!(coordinator.should_execute(&AudioAction::SetActive(true), &state));
        assert!(!coordinator.should_execute(&AudioAction::SetAudioDeviceModule(None), &state));
        assert!(coordinator.should_execute(&AudioAction::RequestRecordPermission, &state));
    }

    #[test]
    fn test_session_actions_compare_resulting_configuration() {
        let coordinator = AudioCoordinator;
        let state = AudioStoreState::default();

        assert!(!coordinator.should_execute(
            &AudioAction::Session(SessionAction::SetCategory(AudioSessionCategory::SoloAmbient)),
            &state
        ));
        assert!(coordinator.should_execute(
            &AudioAction::Session(SessionAction::SetCategory(AudioSessionCategory::PlayAndRecord)),
            &state
        ));
        assert!(!coordinator.should_execute(
            &AudioAction::Session(SessionAction::SetOverrideOutputAudioPort(PortOverride::None)),
            &state
        ));
    }
}
