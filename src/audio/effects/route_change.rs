//! Route change handling

use crate::audio::action::AudioAction;
use crate::audio::state::{AudioRoute, AudioStoreState, PortOverride, RouteChangeReason};

/// Platform route change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeEvent {
    pub reason: RouteChangeReason,
    pub route: AudioRoute,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RouteChangeEffect;

impl RouteChangeEffect {
    pub fn actions(&self, event: RouteChangeEvent, state: &AudioStoreState) -> Vec<AudioAction> {
        let speaker_requested =
            state.audio_session_configuration.override_output_audio_port == PortOverride::Speaker;
        if state.is_active && speaker_requested != event.route.is_speaker() && !event.route.is_external() {
            tracing::warn!(
                reason = ?event.reason,
                speaker_requested,
                speaker_routed = event.route.is_speaker(),
                "Route does not match the requested speaker override"
            );
        }

        vec![AudioAction::SetCurrentRoute(event.route.with_reason(event.reason))]
    }
}
