//! Interruption handling

use crate::audio::action::AudioAction;
use crate::audio::state::AudioStoreState;

/// Platform interruption notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionEvent {
    Began,
    Ended { should_resume: bool },
}

/// Turns interruption notifications into store batches
///
/// The mute state is captured when the interruption begins so that it can
/// be restored once the device module restarts.
#[derive(Debug, Default)]
pub struct InterruptionEffect {
    prior_muted: Option<bool>,
}

impl InterruptionEffect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&mut self, event: InterruptionEvent, state: &AudioStoreState) -> Vec<AudioAction> {
        match event {
            InterruptionEvent::Began => {
                self.prior_muted = Some(state.is_microphone_muted);
                vec![AudioAction::SetInterrupted(true)]
            }
            InterruptionEvent::Ended { should_resume } => {
                let prior_muted = self.prior_muted.take().unwrap_or(state.is_microphone_muted);
                let mut actions = vec![AudioAction::SetInterrupted(false)];
                if should_resume && state.audio_device_module.is_some() {
                    actions.extend([
                        AudioAction::SetRecording(false),
                        AudioAction::SetRecording(true),
                        AudioAction::SetMicrophoneMuted(prior_muted),
                    ]);
                }
                actions
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::device_module::DeviceModuleHandle;
    use crate::audio::simulated::SimulatedDeviceModule;
    use std::sync::Arc;

    fn with_module(muted: bool) -> AudioStoreState {
        AudioStoreState {
            is_microphone_muted: muted,
            audio_device_module: Some(DeviceModuleHandle::from(Arc::new(SimulatedDeviceModule::new("adm")))),
            ..AudioStoreState::default()
        }
    }

    #[test]
    fn test_began() {
        let mut effect = InterruptionEffect::new();
        assert_eq!(
            effect.actions(InterruptionEvent::Began, &AudioStoreState::default()),
            vec![AudioAction::SetInterrupted(true)]
        );
    }

    #[test]
    fn test_ended_without_resume() {
        let mut effect = InterruptionEffect::new();
        let actions = effect.actions(InterruptionEvent::Ended { should_resume: false }, &with_module(false));
        assert_eq!(actions, vec![AudioAction::SetInterrupted(false)]);
    }

    #[test]
    fn test_ended_with_resume_without_module() {
        let mut effect = InterruptionEffect::new();
        let actions = effect.actions(
            InterruptionEvent::Ended { should_resume: true },
            &AudioStoreState::default(),
        );
        assert_eq!(actions, vec![AudioAction::SetInterrupted(false)]);
    }

    #[test]
    fn test_ended_with_resume_restores_prior_mute() {
        let mut effect = InterruptionEffect::new();
        effect.actions(InterruptionEvent::Began, &with_module(true));

        let actions = effect.actions(InterruptionEvent::Ended { should_resume: true }, &with_module(false));
        assert_eq!(
            actions,
            vec![
                AudioAction::SetInterrupted(false),
                AudioAction::SetRecording(false),
                AudioAction::SetRecording(true),
                AudioAction::SetMicrophoneMuted(true),
            ]
        );
    }
}
