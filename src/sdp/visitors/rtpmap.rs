//! Codec name to payload type collection

use std::collections::HashMap;

use super::parse_rtpmap;
use crate::sdp::{SdpLineVisitor, SupportedPrefix};

/// Collects `codec -> payload type` from `a=rtpmap:` lines.
///
/// The map is not scoped per media section; run it over a single
/// section's lines when payload types must be disambiguated.
#[derive(Debug, Default, Clone)]
pub struct RtpMapVisitor {
    codec_map: HashMap<String, u8>,
}

impl RtpMapVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload type negotiated for a codec (case insensitive)
    pub fn payload_type(&self, codec: &str) -> Option<u8> {
        self.codec_map.get(&codec.to_ascii_lowercase()).copied()
    }

    pub fn codecs(&self) -> &HashMap<String, u8> {
        &self.codec_map
    }
}

impl SdpLineVisitor for RtpMapVisitor {
    fn supported_prefixes(&self) -> &'static [SupportedPrefix] {
        &[SupportedPrefix::RtpMap]
    }

    fn visit(&mut self, line: &str) {
        let Some(value) = SupportedPrefix::RtpMap.strip(line) else {
            return;
        };
        let Some((payload, codec)) = parse_rtpmap(value) else {
            return;
        };
        let Ok(payload) = payload.parse::<u8>() else {
            return;
        };
        self.codec_map.insert(codec, payload);
    }

    fn reset(&mut self) {
        self.codec_map.clear();
    }
}
