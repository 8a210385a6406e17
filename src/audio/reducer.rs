//! Audio store reducers
//!
//! [`AudioStateReducer`] handles activation, bookkeeping flags and the WebRTC
//! wrapper flags. [`SessionConfigurationReducer`] owns category, mode, options
//! and the output port override. Both only update state after the native
//! call succeeded.

use super::action::{AudioAction, SessionAction, WebRtcAction};
use super::session::AudioSessionHandle;
use super::state::{
    AudioSessionCategory, AudioSessionConfiguration, AudioSessionMode, AudioStoreState, CategoryOptions,
    PortOverride,
};
use crate::error::{AudioSessionError, Result};
use crate::store::Reducer;

/// Activation, recording flags, route and WebRTC flags
#[derive(Debug, Clone)]
pub struct AudioStateReducer {
    session: AudioSessionHandle,
}

impl AudioStateReducer {
    pub fn new(session: AudioSessionHandle) -> Self {
        Self { session }
    }
}

impl Reducer<AudioStoreState, AudioAction> for AudioStateReducer {
    fn reduce(&self, mut state: AudioStoreState, action: &AudioAction) -> Result<AudioStoreState> {
        match action {
            AudioAction::SetActive(value) => {
                if state.is_active != *value {
                    self.session.perform(|backend| backend.set_active(*value))?;
                    state.is_active = *value;
                }
            }
            AudioAction::SetInterrupted(value) => state.is_interrupted = *value,
            AudioAction::SetShouldRecord(value) => state.should_record = *value,
            AudioAction::SetRecording(value) => state.is_recording = *value,
            AudioAction::SetMicrophoneMuted(value) => state.is_microphone_muted = *value,
            AudioAction::SetHasRecordingPermission(value) => state.has_recording_permission = *value,
            AudioAction::SetAudioDeviceModule(module) => {
                if module.is_none() {
                    state.stereo.enabled = false;
                }
                state.audio_device_module = module.clone();
            }
            AudioAction::SetCurrentRoute(route) => state.current_route = route.clone(),
            AudioAction::SetPrefersStereoPlayout(value) => state.stereo.preferred = *value,
            AudioAction::SetStereoPlayoutEnabled(value) => state.stereo.enabled = *value,
            AudioAction::WebRtc(action) => self.reduce_webrtc(&mut state, action)?,
            AudioAction::RequestRecordPermission | AudioAction::Session(_) => {}
        }
        Ok(state)
    }
}

impl AudioStateReducer {
    fn reduce_webrtc(&self, state: &mut AudioStoreState, action: &WebRtcAction) -> Result<()> {
        let configuration = &mut state.webrtc_configuration;
        match *action {
            WebRtcAction::SetAudioEnabled(value) => {
                self.session.perform(|backend| {
                    backend.set_audio_enabled(value);
                    Ok(())
                })?;
                configuration.is_audio_enabled = value;
            }
            WebRtcAction::SetUseManualAudio(value) => {
                self.session.perform(|backend| {
                    backend.set_use_manual_audio(value);
                    Ok(())
                })?;
                configuration.use_manual_audio = value;
            }
            WebRtcAction::SetPrefersNoInterruptionsFromSystemAlerts(value) => {
                self.session
                    .perform(|backend| backend.set_prefers_no_interruptions_from_system_alerts(value))?;
                configuration.prefers_no_interruptions_from_system_alerts = value;
            }
        }
        Ok(())
    }
}

/// Category, mode, options and port override
#[derive(Debug, Clone)]
pub struct SessionConfigurationReducer {
    session: AudioSessionHandle,
}

impl SessionConfigurationReducer {
    pub fn new(session: AudioSessionHandle) -> Self {
        Self { session }
    }

    /// Validate and apply a new category/mode/options triple.
    ///
    /// An active session is restarted around the change unless an
    /// interruption is in progress, in which case it is left inactive.
    fn apply_configuration(
        &self,
        current: &AudioSessionConfiguration,
        is_interrupted: bool,
        category: AudioSessionCategory,
        mode: AudioSessionMode,
        options: CategoryOptions,
    ) -> Result<()> {
        if current.category == category && current.mode == mode && current.options == options {
            return Ok(());
        }

        if !super::validator::validate(category, mode, options) {
            tracing::warn!(%category, %mode, %options, "Rejected audio session configuration");
            return Err(AudioSessionError::InvalidConfiguration {
                category: category.to_string(),
                mode: mode.to_string(),
                options: options.to_string(),
            }
            .into());
        }

        self.session.perform(|backend| {
            let requires_restart = backend.is_active() && !is_interrupted;
            if !requires_restart {
                return backend.set_configuration(category, mode, options, false);
            }

            backend.set_active(false)?;
            let result = backend.set_configuration(category, mode, options, true);
            if result.is_err() {
                // The session was active before the attempt, leave it that way
                if let Err(error) = backend.set_active(true) {
                    tracing::error!(%error, "Unable to reactivate audio session after failed configuration");
                }
            }
            result
        })?;

        tracing::debug!(%category, %mode, %options, "Applied audio session configuration");
        Ok(())
    }

    fn apply_override(
        &self,
        state: &mut AudioStoreState,
        port: PortOverride,
    ) -> Result<()> {
        let current = state.audio_session_configuration;
        if current.override_output_audio_port == port {
            return Ok(());
        }

        if current.category == AudioSessionCategory::PlayAndRecord {
            self.session
                .perform(|backend| backend.override_output_audio_port(port))?;
        } else {
            let mut options = self.session.read(|backend| backend.category_options());
            let speaker_on = port == PortOverride::Speaker;
            match (speaker_on, options.contains(CategoryOptions::DEFAULT_TO_SPEAKER)) {
                (true, false) => options.insert(CategoryOptions::DEFAULT_TO_SPEAKER),
                (false, true) => options.remove(CategoryOptions::DEFAULT_TO_SPEAKER),
                _ => {}
            }
            self.apply_configuration(&current, state.is_interrupted, current.category, current.mode, options)?;
            state.audio_session_configuration.options = options;
        }

        state.audio_session_configuration.override_output_audio_port = port;
        Ok(())
    }
}

impl Reducer<AudioStoreState, AudioAction> for SessionConfigurationReducer {
    fn reduce(&self, mut state: AudioStoreState, action: &AudioAction) -> Result<AudioStoreState> {
        let AudioAction::Session(action) = action else {
            return Ok(state);
        };

        match action {
            SessionAction::SetOverrideOutputAudioPort(port) => self.apply_override(&mut state, *port)?,
            _ => {
                let current = state.audio_session_configuration;
                let next = action.apply_to(&current);
                self.apply_configuration(&current, state.is_interrupted, next.category, next.mode, next.options)?;
                state.audio_session_configuration = next;
            }
        }
        Ok(state)
    }
}
