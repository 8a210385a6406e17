//! Effects feeding platform notifications into the audio store
//!
//! Interruption and route notifications share one channel so the store sees
//! them in delivery order. Each notification is turned into one batch and
//! the next notification is only handled once that batch settled.

mod interruption;
mod route_change;
mod stereo_playout;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use interruption::{InterruptionEffect, InterruptionEvent};
pub use route_change::{RouteChangeEffect, RouteChangeEvent};
pub use stereo_playout::StereoPlayoutEffect;

use super::AudioStore;

/// Notification coming from the platform audio session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSessionEvent {
    Interruption(InterruptionEvent),
    RouteChange(RouteChangeEvent),
}

/// Running effect task; cancelled on drop
#[derive(Debug)]
pub struct EffectHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl EffectHandle {
    pub(crate) fn new(token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            token,
            task: Some(task),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel and wait for the task to finish
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for EffectHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Forwards [`AudioSessionEvent`]s to the interruption and route effects
pub struct SessionEventEffect;

impl SessionEventEffect {
    pub fn spawn(store: &AudioStore, mut events: mpsc::Receiver<AudioSessionEvent>) -> EffectHandle {
        let dispatcher = store.dispatcher();
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut interruption = InterruptionEffect::new();
            let route_change = RouteChangeEffect;

            loop {
                let event = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };
                let Some(state) = dispatcher.state() else {
                    break;
                };

                tracing::debug!(?event, "Audio session event");
                let actions = match event {
                    AudioSessionEvent::Interruption(event) => interruption.actions(event, &state),
                    AudioSessionEvent::RouteChange(event) => route_change.actions(event, &state),
                };
                if let Err(error) = dispatcher.dispatch(actions).result().await {
                    tracing::warn!(%error, "Audio session event was not applied");
                }
            }
            tracing::debug!("Audio session event effect stopped");
        });

        EffectHandle::new(token, task)
    }
}
