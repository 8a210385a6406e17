//! In-memory platform backends
//!
//! Used by the `audio-store-sim` binary and by tests. Both types are cheap
//! handles over shared state, so a clone kept by the caller observes every
//! call made through the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::device_module::AudioDeviceModule;
use super::middleware::PermissionProvider;
use super::session::AudioSessionBackend;
use super::state::{
    AudioPort, AudioRoute, AudioSessionCategory, AudioSessionMode, CategoryOptions, PortOverride, PortType,
};
use crate::error::AudioSessionError;

/// Observable state of a [`SimulatedAudioSession`]
#[derive(Debug, Clone, Default)]
pub struct SimulatedSessionState {
    pub is_active: bool,
    pub category: AudioSessionCategory,
    pub mode: AudioSessionMode,
    pub options: CategoryOptions,
    pub port_override: PortOverride,
    pub is_audio_enabled: bool,
    pub use_manual_audio: bool,
    pub prefers_no_interruptions: bool,
    pub route: AudioRoute,
    /// Native calls in the order they were made
    pub calls: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    state: SimulatedSessionState,
    failure: Option<(Option<&'static str>, AudioSessionError)>,
}

/// Audio session that records calls instead of touching hardware
#[derive(Debug, Clone, Default)]
pub struct SimulatedAudioSession {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedAudioSession {
    pub fn new() -> Self {
        let session = Self::default();
        session.inner.lock().state.route = AudioRoute::new(
            vec![AudioPort::new(PortType::BuiltInMic, "Built-In Microphone", "mic")],
            vec![AudioPort::new(PortType::BuiltInReceiver, "Receiver", "receiver")],
        );
        session
    }

    pub fn snapshot(&self) -> SimulatedSessionState {
        self.inner.lock().state.clone()
    }

    /// Make the next fallible native call fail with `error`
    pub fn fail_next(&self, error: AudioSessionError) {
        self.inner.lock().failure = Some((None, error));
    }

    /// Make the next call to `operation` fail with `error`, letting other
    /// calls through until then
    pub fn fail_next_call(&self, operation: &'static str, error: AudioSessionError) {
        self.inner.lock().failure = Some((Some(operation), error));
    }

    pub fn set_route(&self, route: AudioRoute) {
        self.inner.lock().state.route = route;
    }

    fn call(&self, name: String) -> Result<(), AudioSessionError> {
        let mut inner = self.inner.lock();
        let matches = match &inner.failure {
            Some((Some(operation), _)) => name.starts_with(&format!("{operation}(")),
            Some((None, _)) => true,
            None => false,
        };
        inner.state.calls.push(name);
        if matches {
            if let Some((_, error)) = inner.failure.take() {
                return Err(error);
            }
        }
        Ok(())
    }
}

impl AudioSessionBackend for SimulatedAudioSession {
    fn is_active(&self) -> bool {
        self.inner.lock().state.is_active
    }

    fn set_active(&mut self, active: bool) -> Result<(), AudioSessionError> {
        self.call(format!("set_active({active})"))?;
        self.inner.lock().state.is_active = active;
        Ok(())
    }

    fn category_options(&self) -> CategoryOptions {
        self.inner.lock().state.options
    }

    fn set_configuration(
        &mut self,
        category: AudioSessionCategory,
        mode: AudioSessionMode,
        options: CategoryOptions,
        active: bool,
    ) -> Result<(), AudioSessionError> {
        self.call(format!("set_configuration({category}, {mode}, {options}, active:{active})"))?;
        let mut inner = self.inner.lock();
        inner.state.category = category;
        inner.state.mode = mode;
        inner.state.options = options;
        inner.state.is_active = active;
        Ok(())
    }

    fn override_output_audio_port(&mut self, port: PortOverride) -> Result<(), AudioSessionError> {
        self.call(format!("override_output_audio_port({port:?})"))?;
        let mut inner = self.inner.lock();
        inner.state.port_override = port;
        let (name, port_type) = match port {
            PortOverride::Speaker => ("Speaker", PortType::BuiltInSpeaker),
            PortOverride::None => ("Receiver", PortType::BuiltInReceiver),
        };
        inner.state.route.outputs = vec![AudioPort::new(port_type, name, name.to_lowercase())];
        Ok(())
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.state.calls.push(format!("set_audio_enabled({enabled})"));
        inner.state.is_audio_enabled = enabled;
    }

    fn set_use_manual_audio(&mut self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.state.calls.push(format!("set_use_manual_audio({enabled})"));
        inner.state.use_manual_audio = enabled;
    }

    fn set_prefers_no_interruptions_from_system_alerts(&mut self, value: bool) -> Result<(), AudioSessionError> {
        self.call(format!("set_prefers_no_interruptions_from_system_alerts({value})"))?;
        self.inner.lock().state.prefers_no_interruptions = value;
        Ok(())
    }

    fn current_route(&self) -> AudioRoute {
        self.inner.lock().state.route.clone()
    }
}

/// Device module driven entirely from memory
pub struct SimulatedDeviceModule {
    id: String,
    recording: watch::Sender<bool>,
    muted: watch::Sender<bool>,
    stereo_capable: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl SimulatedDeviceModule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            recording: watch::Sender::new(false),
            muted: watch::Sender::new(false),
            stereo_capable: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn set_stereo_capable(&self, capable: bool) {
        self.stereo_capable.store(capable, Ordering::SeqCst);
    }

    /// Mute change coming from the media stack rather than the store
    pub fn simulate_mute(&self, muted: bool) {
        self.muted.send_replace(muted);
    }
}

impl AudioDeviceModule for SimulatedDeviceModule {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_recording(&self) -> bool {
        *self.recording.borrow()
    }

    fn is_microphone_muted(&self) -> bool {
        *self.muted.borrow()
    }

    fn set_recording(&self, enabled: bool) -> Result<(), AudioSessionError> {
        self.calls.lock().push(format!("set_recording({enabled})"));
        self.recording.send_replace(enabled);
        Ok(())
    }

    fn set_muted(&self, muted: bool) -> Result<(), AudioSessionError> {
        self.calls.lock().push(format!("set_muted({muted})"));
        self.muted.send_replace(muted);
        Ok(())
    }

    fn refresh_stereo_playout(&self) -> Result<bool, AudioSessionError> {
        self.calls.lock().push("refresh_stereo_playout".to_string());
        Ok(self.stereo_capable.load(Ordering::SeqCst))
    }

    fn recording_updates(&self) -> watch::Receiver<bool> {
        self.recording.subscribe()
    }

    fn mute_updates(&self) -> watch::Receiver<bool> {
        self.muted.subscribe()
    }
}

/// Permission prompt with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct SimulatedPermissionProvider {
    pub granted: bool,
}

#[async_trait::async_trait]
impl PermissionProvider for SimulatedPermissionProvider {
    async fn request_record_permission(&self) -> Result<bool, AudioSessionError> {
        Ok(self.granted)
    }
}
