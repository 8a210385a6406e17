//! # RTC Audio Store
//!
//! Session negotiation and audio routing core for WebRTC calls.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────── SDP PIPELINE ────────────────────────────────┐
//! │                                                                              │
//! │  SDP text ──► parser::visit_lines ──► StereoEnableVisitor ──► replacements   │
//! │                                       RtpMapVisitor                │         │
//! │                                                                    ▼         │
//! │                        apply_stereo_updates / StereoEnableWriter ──► SDP     │
//! └──────────────────────────────────────────────────────────────────────────────┘
//!
//! ┌──────────────────────────────── AUDIO STORE ─────────────────────────────────┐
//! │                                                                              │
//! │  OS events ──► effects ─┐                                                    │
//! │  policy ──► CallAudio ──┼──► store (single worker, FIFO)                     │
//! │  user intent ───────────┘      │                                             │
//! │                                ▼                                             │
//! │     coordinator ──► middleware ──► reducers ──► watch<AudioStoreState>       │
//! │                        │              │                 │                    │
//! │                        ▼              ▼                 ▼                    │
//! │               AudioDeviceModule  AudioSessionHandle  publishers / stats      │
//! └──────────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod sdp;
pub mod stats;
pub mod store;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Store identifier used in logs
    pub const AUDIO_STORE_IDENTIFIER: &str = "audio-store";

    /// Pending batches per store before `dispatch` fails fast
    pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

    /// Quiet period after a route change before stereo playout is refreshed
    pub const DEFAULT_STEREO_REFRESH_DEBOUNCE_MS: u64 = 2000;

    /// Default interval between stats reports
    pub const DEFAULT_STATS_INTERVAL_MS: u64 = 5000;
}
