//! Allowed category / mode / option combinations

use super::state::{AudioSessionCategory, AudioSessionConfiguration, AudioSessionMode, CategoryOptions};

use AudioSessionMode as Mode;

struct Allowed {
    modes: &'static [AudioSessionMode],
    options: CategoryOptions,
}

const AMBIENT_OPTIONS: CategoryOptions = CategoryOptions::from_bits(
    CategoryOptions::MIX_WITH_OTHERS.bits()
        | CategoryOptions::DUCK_OTHERS.bits()
        | CategoryOptions::INTERRUPT_SPOKEN_AUDIO_AND_MIX_WITH_OTHERS.bits(),
);

const PLAYBACK_OPTIONS: CategoryOptions = CategoryOptions::from_bits(
    AMBIENT_OPTIONS.bits()
        | CategoryOptions::DEFAULT_TO_SPEAKER.bits()
        | CategoryOptions::ALLOW_BLUETOOTH_A2DP.bits(),
);

const PLAY_AND_RECORD_OPTIONS: CategoryOptions =
    CategoryOptions::from_bits(PLAYBACK_OPTIONS.bits() | CategoryOptions::ALLOW_BLUETOOTH_HFP.bits());

fn allowed(category: AudioSessionCategory) -> Allowed {
    match category {
        AudioSessionCategory::Playback => Allowed {
            modes: &[Mode::Default, Mode::MoviePlayback, Mode::SpokenAudio, Mode::VoicePrompt],
            options: PLAYBACK_OPTIONS,
        },
        AudioSessionCategory::PlayAndRecord => Allowed {
            modes: &[
                Mode::Default,
                Mode::VoiceChat,
                Mode::VideoChat,
                Mode::GameChat,
                Mode::VideoRecording,
                Mode::Measurement,
                Mode::SpokenAudio,
                Mode::VoicePrompt,
            ],
            options: PLAY_AND_RECORD_OPTIONS,
        },
        AudioSessionCategory::Record => Allowed {
            modes: &[Mode::Default, Mode::Measurement],
            options: CategoryOptions::DUCK_OTHERS,
        },
        AudioSessionCategory::MultiRoute => Allowed {
            modes: &[Mode::Default, Mode::Measurement],
            options: CategoryOptions::MIX_WITH_OTHERS,
        },
        AudioSessionCategory::Ambient | AudioSessionCategory::SoloAmbient => Allowed {
            modes: &[Mode::Default],
            options: AMBIENT_OPTIONS,
        },
    }
}

/// Whether the platform accepts this combination
pub fn validate(category: AudioSessionCategory, mode: AudioSessionMode, options: CategoryOptions) -> bool {
    let allowed = allowed(category);
    allowed.modes.contains(&mode) && allowed.options.contains(options)
}

impl AudioSessionConfiguration {
    pub fn is_valid(&self) -> bool {
        validate(self.category, self.mode, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_configuration_is_valid() {
        assert!(validate(
            AudioSessionCategory::PlayAndRecord,
            Mode::VoiceChat,
            CategoryOptions::CALL
        ));
        assert!(validate(
            AudioSessionCategory::PlayAndRecord,
            Mode::VideoChat,
            CategoryOptions::CALL | CategoryOptions::DEFAULT_TO_SPEAKER
        ));
    }

    #[test]
    fn test_playback_rejects_voice_chat() {
        assert!(!validate(
            AudioSessionCategory::Playback,
            Mode::VoiceChat,
            CategoryOptions::empty()
        ));
    }

    #[test]
    fn test_playback_rejects_hfp() {
        assert!(!validate(
            AudioSessionCategory::Playback,
            Mode::Default,
            CategoryOptions::ALLOW_BLUETOOTH_HFP
        ));
        assert!(validate(
            AudioSessionCategory::Playback,
            Mode::Default,
            CategoryOptions::PLAYBACK
        ));
    }

    #[test]
    fn test_record_and_multi_route() {
        assert!(validate(AudioSessionCategory::Record, Mode::Measurement, CategoryOptions::DUCK_OTHERS));
        assert!(!validate(AudioSessionCategory::Record, Mode::Default, CategoryOptions::MIX_WITH_OTHERS));
        assert!(validate(AudioSessionCategory::MultiRoute, Mode::Default, CategoryOptions::MIX_WITH_OTHERS));
        assert!(!validate(AudioSessionCategory::MultiRoute, Mode::VoiceChat, CategoryOptions::empty()));
    }

    #[test]
    fn test_ambient_only_default_mode() {
        assert!(validate(AudioSessionCategory::SoloAmbient, Mode::Default, CategoryOptions::empty()));
        assert!(!validate(AudioSessionCategory::Ambient, Mode::SpokenAudio, CategoryOptions::empty()));
        assert!(!validate(
            AudioSessionCategory::Ambient,
            Mode::Default,
            CategoryOptions::DEFAULT_TO_SPEAKER
        ));
    }

    #[test]
    fn test_default_configuration_is_valid() {
        assert!(AudioSessionConfiguration::default().is_valid());
    }
}
