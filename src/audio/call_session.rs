//! Call audio session
//!
//! Bridges a call to the audio store: the latest call settings, the user's
//! capabilities and the active policy are combined into a
//! [`PolicyConfiguration`], which is dispatched whenever it changes.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::action::{AudioAction, SessionAction, WebRtcAction};
use super::effects::EffectHandle;
use super::policy::{AudioSessionPolicy, CallSettings, OwnCapability, PolicyConfiguration};
use super::state::{AudioSessionCategory, AudioSessionMode, AudioStoreState, CategoryOptions};
use super::AudioStore;
use crate::store::Dispatcher;

type AudioDispatcher = Dispatcher<AudioStoreState, AudioAction>;

pub struct CallAudioSession {
    dispatcher: AudioDispatcher,
    policy: watch::Sender<Arc<dyn AudioSessionPolicy>>,
    task: Option<EffectHandle>,
}

impl CallAudioSession {
    /// Attach to `store` and move it to the call configuration if needed
    pub fn new(store: &AudioStore, policy: Arc<dyn AudioSessionPolicy>) -> Self {
        let session = Self {
            dispatcher: store.dispatcher(),
            policy: watch::Sender::new(policy),
            task: None,
        };
        session.initial_configuration(&store.state());
        session
    }

    fn initial_configuration(&self, state: &AudioStoreState) {
        let configuration = &state.audio_session_configuration;
        let requires_category_update = configuration.category != AudioSessionCategory::PlayAndRecord;
        let requires_mode_update = !matches!(
            configuration.mode,
            AudioSessionMode::VoiceChat | AudioSessionMode::VideoChat
        );

        if !requires_category_update && !requires_mode_update {
            tracing::info!("Audio session initial configuration isn't required");
            return;
        }

        drop(self.dispatcher.dispatch([AudioAction::Session(SessionAction::SetConfiguration {
            category: AudioSessionCategory::PlayAndRecord,
            mode: AudioSessionMode::VoiceChat,
            options: CategoryOptions::CALL,
        })]));
    }

    pub fn is_activated(&self) -> bool {
        self.task.is_some()
    }

    /// Start following `settings` and `capabilities`
    pub fn activate(
        &mut self,
        settings: watch::Receiver<CallSettings>,
        capabilities: watch::Receiver<HashSet<OwnCapability>>,
    ) {
        self.task = None;

        drop(self.dispatcher.dispatch([AudioAction::WebRtc(WebRtcAction::SetAudioEnabled(true))]));

        let token = CancellationToken::new();
        let task = tokio::spawn(follow(
            self.dispatcher.clone(),
            settings,
            capabilities,
            self.policy.subscribe(),
            token.clone(),
        ));
        self.task = Some(EffectHandle::new(token, task));
    }

    /// Stop following the call and deactivate the session
    pub async fn deactivate(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.stop().await;

        if let Err(error) = self.dispatcher.dispatch([AudioAction::SetActive(false)]).result().await {
            tracing::warn!(%error, "Unable to deactivate audio session");
        }
    }

    /// Swap the policy; the new configuration is applied right away when active
    pub fn set_policy(&self, policy: Arc<dyn AudioSessionPolicy>) {
        self.policy.send_replace(policy);
    }
}

async fn follow(
    dispatcher: AudioDispatcher,
    mut settings: watch::Receiver<CallSettings>,
    mut capabilities: watch::Receiver<HashSet<OwnCapability>>,
    mut policy: watch::Receiver<Arc<dyn AudioSessionPolicy>>,
    token: CancellationToken,
) {
    let mut last: Option<PolicyConfiguration> = None;

    loop {
        let configuration = {
            let settings = *settings.borrow_and_update();
            let capabilities = capabilities.borrow_and_update().clone();
            let policy = policy.borrow_and_update().clone();
            policy.configuration(&settings, &capabilities)
        };

        if last != Some(configuration) {
            if token.is_cancelled() {
                return;
            }
            if apply(&dispatcher, &configuration).await {
                last = Some(configuration);
            }
        }

        let closed = tokio::select! {
            _ = token.cancelled() => return,
            changed = settings.changed() => changed.is_err(),
            changed = capabilities.changed() => changed.is_err(),
            changed = policy.changed() => changed.is_err(),
        };
        if closed || dispatcher.is_closed() {
            tracing::debug!("Call inputs closed, no longer following");
            return;
        }
    }
}

/// Applies the configuration as one batch. The first failing step aborts the
/// rest, so activation never follows a rejected configuration.
async fn apply(dispatcher: &AudioDispatcher, configuration: &PolicyConfiguration) -> bool {
    let mut batch = Vec::with_capacity(3);
    if configuration.is_active {
        batch.push(AudioAction::Session(SessionAction::SetConfiguration {
            category: configuration.category,
            mode: configuration.mode,
            options: configuration.options,
        }));
        if let Some(port) = configuration.override_output_audio_port {
            batch.push(AudioAction::Session(SessionAction::SetOverrideOutputAudioPort(port)));
        }
    }
    batch.push(AudioAction::SetActive(configuration.is_active));

    match dispatcher.dispatch(batch).result().await {
        Ok(()) => true,
        Err(error) => {
            tracing::error!(
                category = %configuration.category,
                mode = %configuration.mode,
                options = %configuration.options,
                port = ?configuration.override_output_audio_port,
                is_active = configuration.is_active,
                %error,
                "Unable to apply configuration"
            );
            false
        }
    }
}
