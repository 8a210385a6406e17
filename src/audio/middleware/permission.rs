//! Microphone permission requests

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::audio::action::AudioAction;
use crate::audio::state::AudioStoreState;
use crate::error::AudioSessionError;
use crate::store::{Dispatcher, Middleware};

/// Platform permission prompt
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Resolve with whether recording is allowed
    async fn request_record_permission(&self) -> Result<bool, AudioSessionError>;
}

/// Answers `RequestRecordPermission` with `SetHasRecordingPermission`
pub struct PermissionMiddleware {
    provider: Arc<dyn PermissionProvider>,
    token: CancellationToken,
}

impl PermissionMiddleware {
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            provider,
            token: CancellationToken::new(),
        }
    }
}

impl Middleware<AudioStoreState, AudioAction> for PermissionMiddleware {
    fn apply(
        &self,
        _state: &AudioStoreState,
        action: &AudioAction,
        dispatcher: &Dispatcher<AudioStoreState, AudioAction>,
    ) {
        if !matches!(action, AudioAction::RequestRecordPermission) {
            return;
        }

        let provider = self.provider.clone();
        let token = self.token.child_token();
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = provider.request_record_permission() => result,
            };

            match result {
                Ok(granted) if !token.is_cancelled() => {
                    tracing::debug!(granted, "Record permission resolved");
                    drop(dispatcher.dispatch([AudioAction::SetHasRecordingPermission(granted)]));
                }
                Ok(_) => {}
                Err(error) => tracing::warn!(%error, "Record permission request failed"),
            }
        });
    }

    fn detach(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use std::time::Duration;

    struct Granting(bool);

    #[async_trait]
    impl PermissionProvider for Granting {
        async fn request_record_permission(&self) -> Result<bool, AudioSessionError> {
            Ok(self.0)
        }
    }

    struct Never;

    #[async_trait]
    impl PermissionProvider for Never {
        async fn request_record_permission(&self) -> Result<bool, AudioSessionError> {
            futures_util::future::pending().await
        }
    }

    fn permission_reducer(
        mut state: AudioStoreState,
        action: &AudioAction,
    ) -> crate::Result<AudioStoreState> {
        if let AudioAction::SetHasRecordingPermission(value) = action {
            state.has_recording_permission = *value;
        }
        Ok(state)
    }

    #[tokio::test]
    async fn test_request_dispatches_result() {
        let store = Store::builder("permissions", AudioStoreState::default())
            .reducer(permission_reducer)
            .middleware(Arc::new(PermissionMiddleware::new(Arc::new(Granting(true)))))
            .build();
        let mut granted = store.publisher(|state: &AudioStoreState| state.has_recording_permission);
        assert_eq!(granted.next().await, Some(false));

        store
            .dispatch([AudioAction::RequestRecordPermission])
            .result()
            .await
            .unwrap();
        assert_eq!(granted.next().await, Some(true));
    }

    #[tokio::test]
    async fn test_detach_cancels_pending_request() {
        let middleware = Arc::new(PermissionMiddleware::new(Arc::new(Never)));
        let store = Store::builder("permissions", AudioStoreState::default())
            .reducer(permission_reducer)
            .middleware(middleware.clone())
            .build();

        store
            .dispatch([AudioAction::RequestRecordPermission])
            .result()
            .await
            .unwrap();
        store.remove_middleware(middleware.clone()).await.unwrap();
        store.dispatch_async(Vec::<AudioAction>::new()).await.unwrap();

        assert!(middleware.token.is_cancelled());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!store.state().has_recording_permission);
    }
}
