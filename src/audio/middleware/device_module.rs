//! Keeps the audio device module in sync with the store

use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;

use crate::audio::action::AudioAction;
use crate::audio::device_module::DeviceModuleHandle;
use crate::audio::state::AudioStoreState;
use crate::store::{Dispatcher, Middleware};

type AudioDispatcher = Dispatcher<AudioStoreState, AudioAction>;

/// Drives recording and mute on the device module and mirrors the
/// module's own recording/mute changes back into the store
#[derive(Default)]
pub struct AudioDeviceModuleMiddleware {
    subscription: Mutex<Option<CancellationToken>>,
}

impl AudioDeviceModuleMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    fn did_set_interrupted(&self, value: bool, state: &AudioStoreState, module: &DeviceModuleHandle) {
        if !state.is_active || !state.should_record {
            return;
        }

        let result = if value {
            module.set_recording(false)
        } else {
            module
                .set_recording(false)
                .and_then(|_| module.set_recording(true))
        };
        if let Err(error) = result {
            tracing::warn!(module = module.id(), interrupted = value, %error, "Unable to update recording");
        }
    }

    fn did_set_should_record(&self, value: bool, module: &DeviceModuleHandle) {
        if module.is_recording() == value {
            return;
        }
        if let Err(error) = module.set_recording(value) {
            tracing::warn!(module = module.id(), recording = value, %error, "Unable to update recording");
        }
    }

    fn did_set_microphone_muted(&self, value: bool, state: &AudioStoreState, module: &DeviceModuleHandle) {
        if !state.should_record {
            return;
        }
        if let Err(error) = module.set_muted(value) {
            tracing::warn!(module = module.id(), muted = value, %error, "Unable to update mute");
        }
    }

    fn did_set_module(
        &self,
        module: Option<&DeviceModuleHandle>,
        state: &AudioStoreState,
        dispatcher: &AudioDispatcher,
    ) {
        if let Some(previous) = &state.audio_device_module {
            if let Err(error) = previous.set_recording(false) {
                tracing::warn!(module = previous.id(), %error, "Unable to stop previous module");
            }
        }

        let mut subscription = self.subscription.lock();
        if let Some(token) = subscription.take() {
            token.cancel();
        }

        let Some(module) = module else {
            return;
        };

        tracing::debug!(module = module.id(), "Subscribing to device module updates");
        let token = CancellationToken::new();
        forward(module.recording_updates(), token.clone(), dispatcher.clone(), AudioAction::SetRecording);
        forward(module.mute_updates(), token.clone(), dispatcher.clone(), AudioAction::SetMicrophoneMuted);
        *subscription = Some(token);
    }
}

/// Dispatch `make(value)` for every change on `updates` until cancelled
fn forward(
    updates: watch::Receiver<bool>,
    token: CancellationToken,
    dispatcher: AudioDispatcher,
    make: fn(bool) -> AudioAction,
) {
    tokio::spawn(async move {
        let mut updates = WatchStream::from_changes(updates);
        loop {
            let value = tokio::select! {
                _ = token.cancelled() => break,
                next = updates.next() => match next {
                    Some(value) => value,
                    None => break,
                },
            };
            if let Err(error) = dispatcher.dispatch([make(value)]).result().await {
                tracing::debug!(%error, "Device module update was not applied");
                if dispatcher.is_closed() {
                    break;
                }
            }
        }
    });
}

impl Middleware<AudioStoreState, AudioAction> for AudioDeviceModuleMiddleware {
    fn apply(&self, state: &AudioStoreState, action: &AudioAction, dispatcher: &AudioDispatcher) {
        if let AudioAction::SetAudioDeviceModule(module) = action {
            self.did_set_module(module.as_ref(), state, dispatcher);
            return;
        }

        let Some(module) = &state.audio_device_module else {
            return;
        };

        match action {
            AudioAction::SetInterrupted(value) => self.did_set_interrupted(*value, state, module),
            AudioAction::SetShouldRecord(value) => self.did_set_should_record(*value, module),
            AudioAction::SetMicrophoneMuted(value) => self.did_set_microphone_muted(*value, state, module),
            _ => {}
        }
    }

    fn detach(&self) {
        if let Some(token) = self.subscription.lock().take() {
            token.cancel();
        }
    }
}
