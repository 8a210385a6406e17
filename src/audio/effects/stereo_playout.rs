//! Stereo playout refresh after route changes

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::EffectHandle;
use crate::audio::action::AudioAction;
use crate::audio::state::{AudioRoute, AudioStoreState};
use crate::audio::AudioStore;
use crate::store::{Dispatcher, StatePublisher};

/// Asks the device module to re-evaluate stereo playout once the route has
/// been stable for `debounce`
pub struct StereoPlayoutEffect;

impl StereoPlayoutEffect {
    pub fn spawn(store: &AudioStore, debounce: Duration) -> EffectHandle {
        let routes = store.publisher(|state: &AudioStoreState| state.current_route.clone());
        let dispatcher = store.dispatcher();
        let token = CancellationToken::new();
        let task = tokio::spawn(run(routes, dispatcher, debounce, token.clone()));
        EffectHandle::new(token, task)
    }
}

async fn run(
    mut routes: StatePublisher<AudioStoreState, AudioRoute>,
    dispatcher: Dispatcher<AudioStoreState, AudioAction>,
    debounce: Duration,
    token: CancellationToken,
) {
    // Current route; only changes after this point trigger a refresh
    if routes.next().await.is_none() {
        return;
    }

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            next = routes.next() => if next.is_none() { return },
        }

        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => break,
                next = routes.next() => if next.is_none() { return },
            }
        }

        refresh(&dispatcher).await;
    }
}

async fn refresh(dispatcher: &Dispatcher<AudioStoreState, AudioAction>) {
    let Some(state) = dispatcher.state() else {
        return;
    };
    if !state.stereo.preferred {
        return;
    }
    let Some(module) = state.audio_device_module else {
        return;
    };

    match module.refresh_stereo_playout() {
        Ok(enabled) => {
            tracing::debug!(module = module.id(), enabled, "Stereo playout refreshed");
            if let Err(error) = dispatcher
                .dispatch([AudioAction::SetStereoPlayoutEnabled(enabled)])
                .result()
                .await
            {
                tracing::debug!(%error, "Stereo playout update was not applied");
            }
        }
        Err(error) => tracing::warn!(module = module.id(), %error, "Unable to refresh stereo playout"),
    }
}
