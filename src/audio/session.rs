//! Platform audio session boundary
//!
//! All native mutations go through [`AudioSessionHandle::perform`], which
//! holds the configuration lock for the whole closure.

use std::sync::Arc;

use parking_lot::Mutex;

use super::state::{AudioRoute, AudioSessionCategory, AudioSessionMode, CategoryOptions, PortOverride};
use crate::error::{AudioSessionError, Result};

/// Native audio session operations
pub trait AudioSessionBackend: Send {
    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool) -> std::result::Result<(), AudioSessionError>;

    /// Options currently applied by the platform
    fn category_options(&self) -> CategoryOptions;

    /// Apply category, mode and options, leaving the session `active` after
    fn set_configuration(
        &mut self,
        category: AudioSessionCategory,
        mode: AudioSessionMode,
        options: CategoryOptions,
        active: bool,
    ) -> std::result::Result<(), AudioSessionError>;

    fn override_output_audio_port(&mut self, port: PortOverride) -> std::result::Result<(), AudioSessionError>;

    fn set_audio_enabled(&mut self, enabled: bool);

    fn set_use_manual_audio(&mut self, enabled: bool);

    fn set_prefers_no_interruptions_from_system_alerts(
        &mut self,
        value: bool,
    ) -> std::result::Result<(), AudioSessionError>;

    fn current_route(&self) -> AudioRoute;
}

/// Shared, lock-guarded access to the native session
#[derive(Clone)]
pub struct AudioSessionHandle {
    backend: Arc<Mutex<Box<dyn AudioSessionBackend>>>,
}

impl AudioSessionHandle {
    pub fn new(backend: impl AudioSessionBackend + 'static) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Box::new(backend))),
        }
    }

    /// Lock the session, run `operation`, unlock.
    ///
    /// Failures are logged here and converted to the crate error type.
    pub fn perform<R, F>(&self, operation: F) -> Result<R>
    where
        F: FnOnce(&mut dyn AudioSessionBackend) -> std::result::Result<R, AudioSessionError>,
    {
        let mut backend = self.backend.lock();
        operation(backend.as_mut()).map_err(|error| {
            tracing::error!(%error, "Audio session operation failed");
            error.into()
        })
    }

    /// Read-only access under the same lock
    pub fn read<R>(&self, reader: impl FnOnce(&dyn AudioSessionBackend) -> R) -> R {
        let backend = self.backend.lock();
        reader(backend.as_ref())
    }

    pub fn is_active(&self) -> bool {
        self.read(|backend| backend.is_active())
    }

    pub fn current_route(&self) -> AudioRoute {
        self.read(|backend| backend.current_route())
    }
}

impl std::fmt::Debug for AudioSessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSessionHandle").finish_non_exhaustive()
    }
}
