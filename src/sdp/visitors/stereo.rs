//! Opus stereo detection per audio media section
//!
//! The visitor walks a small state machine for every audio section:
//!
//! ```text
//!  Idle ──m=audio──► FoundMedia ──a=mid──► FoundMid ──a=rtpmap opus──► FoundOpus
//!   ▲                                         │                           │
//!   └──────────── other rtpmap ───────────────┘                           │
//!   └──────────────────────── a=fmtp (record if payload matches) ─────────┘
//! ```
//!
//! A non-Opus `a=rtpmap` after the `mid` aborts the section: Opus must be
//! the first codec mapped after `a=mid`, which is how WebRTC stacks emit
//! their primary audio codec.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::parse_rtpmap;
use crate::sdp::fmtp::{self, FmtpLine, FmtpParameters};
use crate::sdp::writer::FmtpLineReplacements;
use crate::sdp::{SdpLineVisitor, SupportedPrefix};

const OPUS: &str = "opus";

/// Stereo facts for one audio section
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StereoInfo {
    /// Media identifier of the section
    pub mid: String,
    /// Opus payload type as written in the SDP
    pub codec_payload: String,
    /// Whether the section declared `stereo=1` as received
    pub is_stereo_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum VisitorState {
    Idle,
    FoundMedia(String),
    FoundMid(String),
    FoundOpus { mid: String, payload: String },
}

/// Detects Opus sections and prepares stereo `fmtp` rewrites
#[derive(Debug, Clone)]
pub struct StereoEnableVisitor {
    state: VisitorState,
    found: HashMap<String, StereoInfo>,
    replacements: FmtpLineReplacements,
}

impl Default for StereoEnableVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl StereoEnableVisitor {
    pub fn new() -> Self {
        Self {
            state: VisitorState::Idle,
            found: HashMap::new(),
            replacements: FmtpLineReplacements::new(),
        }
    }

    /// Stereo information keyed by `mid`
    pub fn found(&self) -> &HashMap<String, StereoInfo> {
        &self.found
    }

    /// Original fmtp line to stereo line, only for lines that changed
    pub fn replacements(&self) -> &FmtpLineReplacements {
        &self.replacements
    }

    pub fn into_parts(self) -> (HashMap<String, StereoInfo>, FmtpLineReplacements) {
        (self.found, self.replacements)
    }

    fn did_visit_media(&mut self, line: &str) {
        let is_audio = SupportedPrefix::Media
            .strip(line)
            .map(|value| value.contains("audio"))
            .unwrap_or(false);

        self.state = if is_audio {
            VisitorState::FoundMedia(line.to_string())
        } else {
            VisitorState::Idle
        };
    }

    fn did_visit_mid(&mut self, line: &str) {
        let VisitorState::FoundMedia(media) = &self.state else {
            return;
        };
        if let Some(mid) = SupportedPrefix::Mid.strip(line) {
            tracing::trace!(%media, mid = mid.trim(), "Found audio section");
            self.state = VisitorState::FoundMid(mid.trim().to_string());
        }
    }

    fn did_visit_rtpmap(&mut self, line: &str) {
        let VisitorState::FoundMid(mid) = &self.state else {
            return;
        };

        let opus_payload = SupportedPrefix::RtpMap
            .strip(line)
            .and_then(parse_rtpmap)
            .filter(|(_, codec)| codec.contains(OPUS))
            .map(|(payload, _)| payload.to_string());

        self.state = match opus_payload {
            Some(payload) => VisitorState::FoundOpus {
                mid: mid.clone(),
                payload,
            },
            None => VisitorState::Idle,
        };
    }

    fn did_visit_fmtp(&mut self, line: &str) {
        if !matches!(self.state, VisitorState::FoundOpus { .. }) {
            return;
        }
        let VisitorState::FoundOpus { mid, payload } =
            std::mem::replace(&mut self.state, VisitorState::Idle)
        else {
            return;
        };

        let Some(fmtp_line) = FmtpLine::parse(line) else {
            return;
        };
        if fmtp_line.payload != payload {
            tracing::trace!(%mid, expected = %payload, found = fmtp_line.payload, "fmtp payload mismatch");
            return;
        }

        let is_stereo_enabled = FmtpParameters::parse(fmtp_line.parameters).is_stereo();
        if let Some(replacement) = fmtp::stereo_line(&fmtp_line) {
            self.replacements.insert(line.to_string(), replacement);
        }

        self.found.insert(
            mid.clone(),
            StereoInfo {
                mid,
                codec_payload: payload,
                is_stereo_enabled,
            },
        );
    }
}

impl SdpLineVisitor for StereoEnableVisitor {
    fn supported_prefixes(&self) -> &'static [SupportedPrefix] {
        &SupportedPrefix::ALL
    }

    fn visit(&mut self, line: &str) {
        match SupportedPrefix::of(line) {
            Some(SupportedPrefix::Media) => self.did_visit_media(line),
            Some(SupportedPrefix::Mid) => self.did_visit_mid(line),
            Some(SupportedPrefix::RtpMap) => self.did_visit_rtpmap(line),
            Some(SupportedPrefix::Fmtp) => self.did_visit_fmtp(line),
            None => {}
        }
    }

    fn reset(&mut self) {
        self.state = VisitorState::Idle;
        self.found.clear();
        self.replacements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(mid: &str, payload: &str, fmtp: &str) -> Vec<String> {
        vec![
            "m=audio 51808 UDP/TLS/RTP/SAVPF 111 63".to_string(),
            "c=IN IP4 18.119.157.125".to_string(),
            "a=rtcp:51808 IN IP4 18.119.157.125".to_string(),
            "a=ice-ufrag:AFJnYPvMfEaZeHdt".to_string(),
            "a=setup:actpass".to_string(),
            format!("a=mid:{}", mid),
            "a=sendrecv".to_string(),
            "a=rtcp-mux".to_string(),
            format!("a=rtpmap:{} opus/48000/2", payload),
            format!("a=fmtp:{} {}", payload, fmtp),
        ]
    }

    fn visit_all(visitor: &mut StereoEnableVisitor, lines: &[String]) {
        lines.iter().for_each(|line| visitor.visit(line));
    }

    #[test]
    fn test_one_mid_stereo_enabled() {
        let mut visitor = StereoEnableVisitor::new();
        visit_all(
            &mut visitor,
            &section("0", "111", "maxaveragebitrate=510000;minptime=10;sprop-stereo=1;stereo=1;useinbandfec=1"),
        );

        assert_eq!(visitor.found().len(), 1);
        let info = &visitor.found()["0"];
        assert_eq!(info.mid, "0");
        assert_eq!(info.codec_payload, "111");
        assert!(info.is_stereo_enabled);
        assert!(visitor.replacements().is_empty());
    }

    #[test]
    fn test_two_mids_are_recorded_independently() {
        let mut visitor = StereoEnableVisitor::new();
        let mut lines = section("0", "111", "minptime=10;stereo=1;sprop-stereo=1");
        lines.extend(section("1", "112", "minptime=10;useinbandfec=1"));
        visit_all(&mut visitor, &lines);

        assert_eq!(visitor.found().len(), 2);
        assert!(visitor.found()["0"].is_stereo_enabled);
        assert_eq!(visitor.found()["1"].codec_payload, "112");
        assert!(!visitor.found()["1"].is_stereo_enabled);

        assert_eq!(visitor.replacements().len(), 1);
        assert_eq!(
            visitor.replacements()["a=fmtp:112 minptime=10;useinbandfec=1"],
            "a=fmtp:112 minptime=10;useinbandfec=1;stereo=1;sprop-stereo=1"
        );
    }

    #[test]
    fn test_payload_mismatch_produces_nothing() {
        let mut visitor = StereoEnableVisitor::new();
        visit_all(
            &mut visitor,
            &[
                "m=audio 9 RTP 111".to_string(),
                "a=mid:0".to_string(),
                "a=rtpmap:111 opus/48000/2".to_string(),
                "a=fmtp:112 minptime=10".to_string(),
                "a=fmtp:111 minptime=10".to_string(),
            ],
        );

        assert!(visitor.found().is_empty());
        assert!(visitor.replacements().is_empty());
    }

    #[test]
    fn test_non_opus_rtpmap_aborts_section() {
        let mut visitor = StereoEnableVisitor::new();
        visit_all(
            &mut visitor,
            &[
                "m=audio 9 RTP 0 111".to_string(),
                "a=mid:0".to_string(),
                "a=rtpmap:0 PCMU/8000".to_string(),
                "a=rtpmap:111 opus/48000/2".to_string(),
                "a=fmtp:111 minptime=10".to_string(),
            ],
        );

        assert!(visitor.found().is_empty());
    }

    #[test]
    fn test_video_sections_are_ignored() {
        let mut visitor = StereoEnableVisitor::new();
        visit_all(
            &mut visitor,
            &[
                "m=video 9 RTP 111".to_string(),
                "a=mid:0".to_string(),
                "a=rtpmap:111 opus/48000/2".to_string(),
                "a=fmtp:111 minptime=10".to_string(),
            ],
        );

        assert!(visitor.found().is_empty());
    }

    #[test]
    fn test_new_media_line_restarts_traversal() {
        let mut visitor = StereoEnableVisitor::new();
        let mut lines = vec!["m=audio 9 RTP 111".to_string(), "a=mid:0".to_string()];
        lines.extend(section("1", "111", "minptime=10"));
        visit_all(&mut visitor, &lines);

        assert_eq!(visitor.found().len(), 1);
        assert!(visitor.found().contains_key("1"));
    }

    #[test]
    fn test_reset() {
        let mut visitor = StereoEnableVisitor::new();
        visit_all(&mut visitor, &section("0", "111", "minptime=10"));
        assert!(!visitor.found().is_empty());

        visitor.reset();
        assert!(visitor.found().is_empty());
        assert!(visitor.replacements().is_empty());
    }
}
