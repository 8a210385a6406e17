//! Audio session policies
//!
//! A policy maps the call settings and the user's capabilities to the
//! session configuration the call should run with.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::state::{AudioSessionCategory, AudioSessionMode, CategoryOptions, PortOverride};

/// User-facing toggles of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CallSettings {
    pub audio_on: bool,
    pub video_on: bool,
    pub speaker_on: bool,
}

/// Capabilities granted to the local participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnCapability {
    SendAudio,
    SendVideo,
    Screenshare,
}

/// Hardware class of the current device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    Phone,
    Pad,
    Desktop,
}

impl DeviceKind {
    pub fn has_earpiece(&self) -> bool {
        matches!(self, Self::Phone)
    }
}

/// Configuration produced by a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolicyConfiguration {
    pub is_active: bool,
    pub category: AudioSessionCategory,
    pub mode: AudioSessionMode,
    pub options: CategoryOptions,
    /// `None` leaves the current override untouched
    pub override_output_audio_port: Option<PortOverride>,
}

impl PolicyConfiguration {
    fn playback() -> Self {
        Self {
            is_active: true,
            category: AudioSessionCategory::Playback,
            mode: AudioSessionMode::Default,
            options: CategoryOptions::PLAYBACK,
            override_output_audio_port: None,
        }
    }

    fn call(speaker_on: bool) -> Self {
        Self {
            is_active: true,
            category: AudioSessionCategory::PlayAndRecord,
            mode: AudioSessionMode::VoiceChat,
            options: CategoryOptions::CALL,
            override_output_audio_port: Some(if speaker_on {
                PortOverride::Speaker
            } else {
                PortOverride::None
            }),
        }
    }
}

pub trait AudioSessionPolicy: Send + Sync {
    fn configuration(
        &self,
        settings: &CallSettings,
        capabilities: &HashSet<OwnCapability>,
    ) -> PolicyConfiguration;
}

/// Always configures a two-way call
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAudioSessionPolicy;

impl AudioSessionPolicy for DefaultAudioSessionPolicy {
    fn configuration(&self, settings: &CallSettings, _capabilities: &HashSet<OwnCapability>) -> PolicyConfiguration {
        PolicyConfiguration::call(settings.speaker_on)
    }
}

/// Only records when the user may send audio
///
/// Listeners, and publishers with audio off, get a playback session. A
/// phone keeps the call configuration while audio is off but the speaker is
/// on, since playback would otherwise route to the earpiece.
#[derive(Debug, Default, Clone, Copy)]
pub struct OwnCapabilitiesAudioSessionPolicy {
    device: DeviceKind,
}

impl OwnCapabilitiesAudioSessionPolicy {
    pub fn new(device: DeviceKind) -> Self {
        Self { device }
    }
}

impl AudioSessionPolicy for OwnCapabilitiesAudioSessionPolicy {
    fn configuration(&self, settings: &CallSettings, capabilities: &HashSet<OwnCapability>) -> PolicyConfiguration {
        if !capabilities.contains(&OwnCapability::SendAudio) {
            return PolicyConfiguration::playback();
        }

        if settings.audio_on || (settings.speaker_on && self.device.has_earpiece()) {
            PolicyConfiguration::call(settings.speaker_on)
        } else {
            PolicyConfiguration::playback()
        }
    }
}

/// Policy selector used by configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Default,
    OwnCapabilities,
}

impl PolicyKind {
    pub fn build(self, device: DeviceKind) -> Arc<dyn AudioSessionPolicy> {
        match self {
            Self::Default => Arc::new(DefaultAudioSessionPolicy),
            Self::OwnCapabilities => Arc::new(OwnCapabilitiesAudioSessionPolicy::new(device)),
        }
    }
}
