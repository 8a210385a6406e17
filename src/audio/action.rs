//! Audio store actions

use super::device_module::DeviceModuleHandle;
use super::state::{
    AudioRoute, AudioSessionCategory, AudioSessionConfiguration, AudioSessionMode, CategoryOptions,
    PortOverride,
};
use crate::store::ActionBox;

/// Every intent the audio store understands
#[derive(Debug, Clone, PartialEq)]
pub enum AudioAction {
    SetActive(bool),
    SetInterrupted(bool),
    SetShouldRecord(bool),
    SetRecording(bool),
    SetMicrophoneMuted(bool),
    SetHasRecordingPermission(bool),
    /// Ask the platform for microphone access; answered with
    /// `SetHasRecordingPermission`
    RequestRecordPermission,
    SetAudioDeviceModule(Option<DeviceModuleHandle>),
    SetCurrentRoute(AudioRoute),
    SetPrefersStereoPlayout(bool),
    SetStereoPlayoutEnabled(bool),
    Session(SessionAction),
    WebRtc(WebRtcAction),
}

/// Native session configuration changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    SetCategory(AudioSessionCategory),
    SetMode(AudioSessionMode),
    SetCategoryOptions(CategoryOptions),
    SetCategoryAndMode(AudioSessionCategory, AudioSessionMode),
    SetCategoryAndOptions(AudioSessionCategory, CategoryOptions),
    SetModeAndOptions(AudioSessionMode, CategoryOptions),
    SetConfiguration {
        category: AudioSessionCategory,
        mode: AudioSessionMode,
        options: CategoryOptions,
    },
    SetOverrideOutputAudioPort(PortOverride),
}

impl SessionAction {
    /// Configuration that results from applying this action to `current`
    pub fn apply_to(&self, current: &AudioSessionConfiguration) -> AudioSessionConfiguration {
        let mut next = *current;
        match *self {
            Self::SetCategory(category) => next.category = category,
            Self::SetMode(mode) => next.mode = mode,
            Self::SetCategoryOptions(options) => next.options = options,
            Self::SetCategoryAndMode(category, mode) => {
                next.category = category;
                next.mode = mode;
            }
            Self::SetCategoryAndOptions(category, options) => {
                next.category = category;
                next.options = options;
            }
            Self::SetModeAndOptions(mode, options) => {
                next.mode = mode;
                next.options = options;
            }
            Self::SetConfiguration {
                category,
                mode,
                options,
            } => {
                next.category = category;
                next.mode = mode;
                next.options = options;
            }
            Self::SetOverrideOutputAudioPort(port) => next.override_output_audio_port = port,
        }
        next
    }
}

/// Flags of the WebRTC audio session wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebRtcAction {
    SetAudioEnabled(bool),
    SetUseManualAudio(bool),
    SetPrefersNoInterruptionsFromSystemAlerts(bool),
}

impl From<SessionAction> for AudioAction {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<WebRtcAction> for AudioAction {
    fn from(action: WebRtcAction) -> Self {
        Self::WebRtc(action)
    }
}

// Lets nested actions be dispatched without wrapping them first
impl From<SessionAction> for ActionBox<AudioAction> {
    fn from(action: SessionAction) -> Self {
        ActionBox::new(action.into())
    }
}

impl From<WebRtcAction> for ActionBox<AudioAction> {
    fn from(action: WebRtcAction) -> Self {
        ActionBox::new(action.into())
    }
}
