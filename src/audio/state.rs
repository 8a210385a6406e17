//! Audio store state
//!
//! Everything the store knows about the platform audio session, the device
//! module and the user's recording intent. Values are plain data so that a
//! state snapshot can be compared, logged and published cheaply.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use super::device_module::DeviceModuleHandle;

/// Audio session category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSessionCategory {
    Ambient,
    #[default]
    SoloAmbient,
    Playback,
    Record,
    PlayAndRecord,
    MultiRoute,
}

impl AudioSessionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::SoloAmbient => "solo_ambient",
            Self::Playback => "playback",
            Self::Record => "record",
            Self::PlayAndRecord => "play_and_record",
            Self::MultiRoute => "multi_route",
        }
    }
}

impl fmt::Display for AudioSessionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSessionMode {
    #[default]
    Default,
    VoiceChat,
    VideoChat,
    GameChat,
    VideoRecording,
    Measurement,
    MoviePlayback,
    SpokenAudio,
    VoicePrompt,
}

impl AudioSessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::VoiceChat => "voice_chat",
            Self::VideoChat => "video_chat",
            Self::GameChat => "game_chat",
            Self::VideoRecording => "video_recording",
            Self::Measurement => "measurement",
            Self::MoviePlayback => "movie_playback",
            Self::SpokenAudio => "spoken_audio",
            Self::VoicePrompt => "voice_prompt",
        }
    }
}

impl fmt::Display for AudioSessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category option set
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryOptions(u32);

impl CategoryOptions {
    pub const MIX_WITH_OTHERS: Self = Self(1 << 0);
    pub const DUCK_OTHERS: Self = Self(1 << 1);
    pub const ALLOW_BLUETOOTH_HFP: Self = Self(1 << 2);
    pub const DEFAULT_TO_SPEAKER: Self = Self(1 << 3);
    pub const INTERRUPT_SPOKEN_AUDIO_AND_MIX_WITH_OTHERS: Self = Self(1 << 4);
    pub const ALLOW_BLUETOOTH_A2DP: Self = Self(1 << 5);
    pub const ALLOW_AIR_PLAY: Self = Self(1 << 6);

    /// Options used whenever the session only plays audio
    pub const PLAYBACK: Self = Self::ALLOW_BLUETOOTH_A2DP;

    /// Options used for two-way calls
    pub const CALL: Self = Self(Self::ALLOW_BLUETOOTH_HFP.0 | Self::ALLOW_BLUETOOTH_A2DP.0);

    const NAMES: [(Self, &'static str); 7] = [
        (Self::MIX_WITH_OTHERS, "mix_with_others"),
        (Self::DUCK_OTHERS, "duck_others"),
        (Self::ALLOW_BLUETOOTH_HFP, "allow_bluetooth_hfp"),
        (Self::DEFAULT_TO_SPEAKER, "default_to_speaker"),
        (Self::INTERRUPT_SPOKEN_AUDIO_AND_MIX_WITH_OTHERS, "interrupt_spoken_audio_and_mix_with_others"),
        (Self::ALLOW_BLUETOOTH_A2DP, "allow_bluetooth_a2dp"),
        (Self::ALLOW_AIR_PLAY, "allow_air_play"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when every option in `other` is also set here
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for CategoryOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CategoryOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CategoryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(option, _)| self.contains(*option))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "[{}]", names.join(", "))
    }
}

impl fmt::Debug for CategoryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Output port override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortOverride {
    #[default]
    None,
    Speaker,
}

/// Category, mode, options and port override applied together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AudioSessionConfiguration {
    pub category: AudioSessionCategory,
    pub mode: AudioSessionMode,
    pub options: CategoryOptions,
    pub override_output_audio_port: PortOverride,
}

impl fmt::Display for AudioSessionConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ category:{}, mode:{}, options:{}, override:{:?} }}",
            self.category, self.mode, self.options, self.override_output_audio_port
        )
    }
}

/// Flags owned by the WebRTC audio session wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WebRtcAudioConfiguration {
    pub is_audio_enabled: bool,
    pub use_manual_audio: bool,
    pub prefers_no_interruptions_from_system_alerts: bool,
}

/// Hardware port type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    BuiltInSpeaker,
    BuiltInReceiver,
    BuiltInMic,
    Headphones,
    HeadsetMic,
    BluetoothA2dp,
    BluetoothLe,
    BluetoothHfp,
    CarAudio,
    Usb,
    Other(String),
}

impl PortType {
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::BluetoothA2dp | Self::BluetoothLe | Self::BluetoothHfp | Self::CarAudio | Self::Headphones
        )
    }
}

/// One input or output port of a route
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioPort {
    pub port_type: PortType,
    pub name: String,
    pub id: String,
}

impl AudioPort {
    pub fn new(port_type: PortType, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            port_type,
            name: name.into(),
            id: id.into(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.port_type.is_external()
    }

    pub fn is_speaker(&self) -> bool {
        self.port_type == PortType::BuiltInSpeaker
    }

    pub fn is_receiver(&self) -> bool {
        self.port_type == PortType::BuiltInReceiver
    }
}

/// Why the platform changed the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteChangeReason {
    Unknown,
    NewDeviceAvailable,
    OldDeviceUnavailable,
    CategoryChange,
    Override,
    WakeFromSleep,
    NoSuitableRouteForCategory,
    RouteConfigurationChange,
}

/// Current input and output ports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AudioRoute {
    pub inputs: Vec<AudioPort>,
    pub outputs: Vec<AudioPort>,
    /// Reason of the change that produced this route, if known
    pub reason: Option<RouteChangeReason>,
}

impl AudioRoute {
    pub fn new(inputs: Vec<AudioPort>, outputs: Vec<AudioPort>) -> Self {
        Self {
            inputs,
            outputs,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: RouteChangeReason) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn is_external(&self) -> bool {
        self.outputs.iter().any(AudioPort::is_external)
    }

    pub fn is_speaker(&self) -> bool {
        self.outputs.iter().any(AudioPort::is_speaker)
    }

    pub fn is_receiver(&self) -> bool {
        self.outputs.iter().any(AudioPort::is_receiver)
    }
}

/// Stereo playout preference and the module's last reported capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StereoState {
    pub preferred: bool,
    pub enabled: bool,
}

/// Complete audio store state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioStoreState {
    pub is_active: bool,
    pub is_interrupted: bool,
    pub should_record: bool,
    pub is_recording: bool,
    pub is_microphone_muted: bool,
    pub has_recording_permission: bool,
    pub audio_device_module: Option<DeviceModuleHandle>,
    pub current_route: AudioRoute,
    pub audio_session_configuration: AudioSessionConfiguration,
    pub webrtc_configuration: WebRtcAudioConfiguration,
    pub stereo: StereoState,
}
