//! Audio Store Simulator
//!
//! Drives the audio store against in-memory platform backends through a
//! scripted call: join, speaker toggle, headphones, a phone call
//! interruption and leave. Stats reports are printed as JSON lines.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rtc_audio_store::{
    audio::{
        self,
        effects::{SessionEventEffect, StereoPlayoutEffect},
        simulated::{SimulatedAudioSession, SimulatedDeviceModule, SimulatedPermissionProvider},
        state::{AudioPort, AudioRoute, PortType, RouteChangeReason},
        AudioAction, AudioSessionEvent, AudioSessionHandle, CallAudioSession, CallSettings, DeviceModuleHandle,
        InterruptionEvent, OwnCapability, RouteChangeEvent,
    },
    config::AppConfig,
    constants::DEFAULT_STATS_INTERVAL_MS,
    stats::{ChannelStatsSink, StatsReporter},
};

/// Time between scripted steps
const STEP: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    tracing::info!(policy = ?config.audio.policy, device = ?config.audio.device, "Starting audio store simulator");

    let backend = SimulatedAudioSession::new();
    let session = AudioSessionHandle::new(backend.clone());
    let store = audio::audio_store(
        &session,
        Arc::new(SimulatedPermissionProvider { granted: true }),
        &config.store,
    );

    // Platform notifications
    let (events_tx, events_rx) = mpsc::channel(16);
    let events = SessionEventEffect::spawn(&store, events_rx);
    let stereo = StereoPlayoutEffect::spawn(&store, config.audio.stereo_refresh_debounce());

    // Stats printed on stdout
    let (stats_tx, mut stats_rx) = mpsc::channel(16);
    let reporter = StatsReporter::new(Duration::from_millis(DEFAULT_STATS_INTERVAL_MS));
    tracing::info!(session_id = %reporter.session_id(), "Stats reporting");
    let stats = reporter.spawn(&store, Arc::new(ChannelStatsSink::new(stats_tx)));
    let printer = tokio::spawn(async move {
        while let Some(report) = stats_rx.recv().await {
            match report.to_json() {
                Ok(json) => println!("{json}"),
                Err(error) => tracing::warn!(%error, "Unable to encode stats report"),
            }
        }
    });

    let module = Arc::new(SimulatedDeviceModule::new("adm-0"));
    store
        .dispatch_async([
            AudioAction::RequestRecordPermission,
            AudioAction::SetPrefersStereoPlayout(config.audio.prefer_stereo_playout),
            AudioAction::SetAudioDeviceModule(Some(DeviceModuleHandle::from(module.clone()))),
        ])
        .await
        .context("Failed to prepare audio store")?;

    // Join the call
    let mut call = CallAudioSession::new(&store, config.audio.policy.build(config.audio.device));
    let (settings_tx, settings_rx) = watch::channel(CallSettings {
        audio_on: true,
        video_on: false,
        speaker_on: false,
    });
    let capabilities = watch::Sender::new(HashSet::from([OwnCapability::SendAudio, OwnCapability::SendVideo]));
    call.activate(settings_rx, capabilities.subscribe());
    store
        .dispatch_async([AudioAction::SetShouldRecord(true)])
        .await
        .context("Failed to start recording")?;
    tokio::time::sleep(STEP).await;

    tracing::info!("Turning speaker on");
    settings_tx.send_modify(|settings| settings.speaker_on = true);
    tokio::time::sleep(STEP).await;

    tracing::info!("Plugging headphones");
    let headphones = AudioRoute::new(
        vec![AudioPort::new(PortType::BuiltInMic, "Built-In Microphone", "mic")],
        vec![AudioPort::new(PortType::Headphones, "Headphones", "wired")],
    );
    backend.set_route(headphones.clone());
    events_tx
        .send(AudioSessionEvent::RouteChange(RouteChangeEvent {
            reason: RouteChangeReason::NewDeviceAvailable,
            route: headphones,
        }))
        .await
        .context("Event effect stopped")?;
    tokio::time::sleep(config.audio.stereo_refresh_debounce() + STEP).await;

    tracing::info!("Incoming phone call");
    events_tx
        .send(AudioSessionEvent::Interruption(InterruptionEvent::Began))
        .await
        .context("Event effect stopped")?;
    tokio::time::sleep(STEP).await;
    events_tx
        .send(AudioSessionEvent::Interruption(InterruptionEvent::Ended { should_resume: true }))
        .await
        .context("Event effect stopped")?;
    tokio::time::sleep(STEP).await;

    tracing::info!("Leaving the call");
    call.deactivate().await;
    store
        .dispatch_async([AudioAction::SetShouldRecord(false), AudioAction::SetAudioDeviceModule(None)])
        .await
        .context("Failed to release device module")?;

    events.stop().await;
    stereo.stop().await;
    stats.stop().await;
    let _ = printer.await;

    let snapshot = backend.snapshot();
    tracing::info!(calls = snapshot.calls.len(), "Native session calls");
    for call in &snapshot.calls {
        tracing::info!("  {call}");
    }
    for call in module.calls() {
        tracing::info!("  adm: {call}");
    }
    tracing::info!(state = ?store.state(), "Final store state");

    Ok(())
}
