//! Periodic audio session stats
//!
//! [`StatsReporter`] samples the audio store on a fixed interval and pushes
//! a [`CallStatsReport`] to a [`StatsSink`]. Delivery to the signaling
//! server is the sink's concern.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::audio::effects::EffectHandle;
use crate::audio::state::{
    AudioSessionCategory, AudioSessionMode, AudioStoreState, PortOverride, RouteChangeReason,
};
use crate::audio::AudioStore;
use crate::error::{Error, Result};

/// Flattened view of the audio state, as reported to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSessionTrace {
    pub is_active: bool,
    pub is_interrupted: bool,
    pub is_recording: bool,
    pub is_microphone_muted: bool,
    pub has_recording_permission: bool,
    pub category: AudioSessionCategory,
    pub mode: AudioSessionMode,
    pub options: String,
    pub override_output_audio_port: PortOverride,
    pub route_outputs: Vec<String>,
    pub route_reason: Option<RouteChangeReason>,
    pub has_device_module: bool,
    pub stereo_playout: bool,
}

impl From<&AudioStoreState> for AudioSessionTrace {
    fn from(state: &AudioStoreState) -> Self {
        let configuration = &state.audio_session_configuration;
        Self {
            is_active: state.is_active,
            is_interrupted: state.is_interrupted,
            is_recording: state.is_recording,
            is_microphone_muted: state.is_microphone_muted,
            has_recording_permission: state.has_recording_permission,
            category: configuration.category,
            mode: configuration.mode,
            options: configuration.options.to_string(),
            override_output_audio_port: configuration.override_output_audio_port,
            route_outputs: state
                .current_route
                .outputs
                .iter()
                .map(|port| port.name.clone())
                .collect(),
            route_reason: state.current_route.reason,
            has_device_module: state.audio_device_module.is_some(),
            stereo_playout: state.stereo.enabled,
        }
    }
}

/// One stats sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallStatsReport {
    pub session_id: Uuid,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub audio_session: AudioSessionTrace,
}

impl CallStatsReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Destination of stats reports
#[async_trait]
pub trait StatsSink: Send + Sync {
    async fn send(&self, report: CallStatsReport) -> Result<()>;
}

/// Sink forwarding reports into a channel
#[derive(Debug, Clone)]
pub struct ChannelStatsSink {
    sender: mpsc::Sender<CallStatsReport>,
}

impl ChannelStatsSink {
    pub fn new(sender: mpsc::Sender<CallStatsReport>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl StatsSink for ChannelStatsSink {
    async fn send(&self, report: CallStatsReport) -> Result<()> {
        self.sender
            .send(report)
            .await
            .map_err(|_| Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stats receiver dropped")))
    }
}

/// Periodic sampler of the audio store
pub struct StatsReporter {
    session_id: Uuid,
    interval: Duration,
}

impl StatsReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            interval,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Start sampling; the first report is sent immediately
    pub fn spawn(self, store: &AudioStore, sink: Arc<dyn StatsSink>) -> EffectHandle {
        let dispatcher = store.dispatcher();
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut sequence = 0u64;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(state) = dispatcher.state() else {
                    break;
                };
                let report = CallStatsReport {
                    session_id: self.session_id,
                    sequence,
                    timestamp: Utc::now(),
                    audio_session: AudioSessionTrace::from(&state),
                };
                sequence += 1;

                if let Err(error) = sink.send(report).await {
                    tracing::warn!(%error, "Unable to deliver stats report");
                }
            }
            tracing::debug!(session_id = %self.session_id, sent = sequence, "Stats reporter stopped");
        });

        EffectHandle::new(token, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::state::{AudioPort, AudioRoute, PortType};

    #[test]
    fn test_trace_from_state() {
        let state = AudioStoreState {
            is_active: true,
            current_route: AudioRoute::new(vec![], vec![AudioPort::new(PortType::BuiltInSpeaker, "Speaker", "spk")])
                .with_reason(RouteChangeReason::Override),
            ..AudioStoreState::default()
        };

        let trace = AudioSessionTrace::from(&state);
        assert!(trace.is_active);
        assert_eq!(trace.route_outputs, vec!["Speaker".to_string()]);
        assert_eq!(trace.route_reason, Some(RouteChangeReason::Override));
        assert!(!trace.has_device_module);
    }

    #[test]
    fn test_report_json() {
        let report = CallStatsReport {
            session_id: Uuid::nil(),
            sequence: 3,
            timestamp: Utc::now(),
            audio_session: AudioSessionTrace::from(&AudioStoreState::default()),
        };

        let json = report.to_json().unwrap();
        assert!(json.contains("\"sequence\":3"));
        assert!(json.contains("\"category\":\"solo_ambient\""));
    }
}
