//! Audio session state machine
//!
//! An [`AudioStore`] reconciles the platform audio session with
//! interruptions, route changes, call settings and user intent.
//!
//! ```text
//!  platform events ──► SessionEventEffect ──┐
//!  CallAudioSession (policy) ───────────────┼──► AudioStore ──► AudioStateReducer
//!  user intent ─────────────────────────────┘        │          SessionConfigurationReducer
//!                                                    │                 │
//!                      AudioDeviceModuleMiddleware ◄─┤                 ▼
//!                      PermissionMiddleware ◄────────┘        AudioSessionHandle::perform
//! ```

pub mod action;
pub mod call_session;
pub mod coordinator;
pub mod device_module;
pub mod effects;
pub mod middleware;
pub mod policy;
pub mod reducer;
pub mod session;
pub mod simulated;
pub mod state;
pub mod validator;

use std::sync::Arc;

pub use action::{AudioAction, SessionAction, WebRtcAction};
pub use call_session::CallAudioSession;
pub use coordinator::AudioCoordinator;
pub use device_module::{AudioDeviceModule, DeviceModuleHandle};
pub use effects::{AudioSessionEvent, EffectHandle, InterruptionEvent, RouteChangeEvent};
pub use middleware::{AudioDeviceModuleMiddleware, PermissionMiddleware, PermissionProvider};
pub use policy::{AudioSessionPolicy, CallSettings, OwnCapability, PolicyKind};
pub use reducer::{AudioStateReducer, SessionConfigurationReducer};
pub use session::{AudioSessionBackend, AudioSessionHandle};
pub use state::AudioStoreState;

use crate::config::StoreConfig;
use crate::constants::AUDIO_STORE_IDENTIFIER;
use crate::store::Store;

/// Store specialised for the audio session
pub type AudioStore = Store<AudioStoreState, AudioAction>;

/// Build the audio store with its reducers, middleware and coordinator.
///
/// The initial state mirrors the backend's activation and route. Must be
/// called within a Tokio runtime.
pub fn audio_store(
    session: &AudioSessionHandle,
    permissions: Arc<dyn PermissionProvider>,
    config: &StoreConfig,
) -> AudioStore {
    let initial = AudioStoreState {
        is_active: session.is_active(),
        current_route: session.current_route(),
        ..AudioStoreState::default()
    };

    Store::builder(AUDIO_STORE_IDENTIFIER, initial)
        .reducer(AudioStateReducer::new(session.clone()))
        .reducer(SessionConfigurationReducer::new(session.clone()))
        .middleware(Arc::new(AudioDeviceModuleMiddleware::new()))
        .middleware(Arc::new(PermissionMiddleware::new(permissions)))
        .coordinator(AudioCoordinator)
        .queue_capacity(config.queue_capacity)
        .build()
}
