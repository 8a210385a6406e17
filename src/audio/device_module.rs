//! Audio device module boundary
//!
//! The device module owns the recording and playout engines of the media
//! stack. The store only drives it through this trait and listens to its
//! recording and mute state.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::AudioSessionError;

/// Recording/playout engine of the media stack
pub trait AudioDeviceModule: Send + Sync {
    /// Stable identifier, used for logging
    fn id(&self) -> &str;

    fn is_recording(&self) -> bool;

    fn is_microphone_muted(&self) -> bool;

    fn set_recording(&self, enabled: bool) -> Result<(), AudioSessionError>;

    fn set_muted(&self, muted: bool) -> Result<(), AudioSessionError>;

    /// Re-evaluate stereo playout for the current route.
    /// Returns whether stereo playout is now enabled.
    fn refresh_stereo_playout(&self) -> Result<bool, AudioSessionError>;

    /// Recording state, replaying the latest value
    fn recording_updates(&self) -> watch::Receiver<bool>;

    /// Microphone mute state, replaying the latest value
    fn mute_updates(&self) -> watch::Receiver<bool>;
}

/// Shared device module reference stored in the audio state
///
/// Two handles are equal when they point at the same module.
#[derive(Clone)]
pub struct DeviceModuleHandle(Arc<dyn AudioDeviceModule>);

impl DeviceModuleHandle {
    pub fn new(module: Arc<dyn AudioDeviceModule>) -> Self {
        Self(module)
    }
}

impl<M: AudioDeviceModule + 'static> From<Arc<M>> for DeviceModuleHandle {
    fn from(module: Arc<M>) -> Self {
        Self(module)
    }
}

impl Deref for DeviceModuleHandle {
    type Target = dyn AudioDeviceModule;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for DeviceModuleHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl Eq for DeviceModuleHandle {}

impl fmt::Debug for DeviceModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceModuleHandle")
            .field("id", &self.0.id())
            .field("is_recording", &self.0.is_recording())
            .field("is_microphone_muted", &self.0.is_microphone_muted())
            .finish()
    }
}
