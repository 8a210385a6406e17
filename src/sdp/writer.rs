//! SDP rewriting
//!
//! Two ways to write stereo into a session description:
//!
//! - [`apply_stereo_updates`] replaces whole lines using the map built by
//!   [`StereoEnableVisitor`](super::StereoEnableVisitor).
//!   [`apply_section_stereo_updates`] does the same but only inside the
//!   sections the visitor accepted.
//! - [`StereoEnableWriter`] is driven line by line from a `mid` keyed map of
//!   [`StereoInfo`], typically collected from the remote offer.

use std::collections::HashMap;

use super::fmtp::{self, FmtpLine};
use super::visitors::StereoInfo;
use super::{lines, SupportedPrefix, LINE_SEPARATOR};

/// Original `a=fmtp` line text to its stereo replacement
pub type FmtpLineReplacements = HashMap<String, String>;

/// Replace every line present as a key in `replacements`.
///
/// Other lines are emitted unchanged and in order. An empty map returns the
/// input as is.
pub fn apply_stereo_updates(sdp: &str, replacements: &FmtpLineReplacements) -> String {
    if replacements.is_empty() {
        return sdp.to_owned();
    }

    lines(sdp)
        .map(|line| replacements.get(line).map(String::as_str).unwrap_or(line))
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Replace keyed lines, but only the Opus `fmtp` line of a section in `found`.
///
/// Identical `fmtp` text in a section the visitor rejected is left alone.
pub fn apply_section_stereo_updates(
    sdp: &str,
    found: &HashMap<String, StereoInfo>,
    replacements: &FmtpLineReplacements,
) -> String {
    if replacements.is_empty() {
        return sdp.to_owned();
    }

    let mut current: Option<&StereoInfo> = None;
    lines(sdp)
        .map(|line| match SupportedPrefix::of(line) {
            Some(SupportedPrefix::Media) => {
                current = None;
                line
            }
            Some(SupportedPrefix::Mid) => {
                current = SupportedPrefix::Mid
                    .strip(line)
                    .and_then(|mid| found.get(mid.trim()));
                line
            }
            Some(SupportedPrefix::Fmtp) => current
                .filter(|info| FmtpLine::parse(line).is_some_and(|fmtp| fmtp.payload == info.codec_payload))
                .and_then(|_| replacements.get(line))
                .map(String::as_str)
                .unwrap_or(line),
            _ => line,
        })
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Line-by-line stereo writer scoped by `mid`
#[derive(Debug, Clone)]
pub struct StereoEnableWriter {
    stereo_info: HashMap<String, StereoInfo>,
    current_mid: Option<String>,
}

impl StereoEnableWriter {
    pub fn new(stereo_info: HashMap<String, StereoInfo>) -> Self {
        Self {
            stereo_info,
            current_mid: None,
        }
    }

    /// Return `line`, rewritten if it is the Opus fmtp of a stereo section
    pub fn visit(&mut self, line: &str) -> String {
        match SupportedPrefix::of(line) {
            Some(SupportedPrefix::Media) => {
                self.current_mid = None;
                line.to_string()
            }
            Some(SupportedPrefix::Mid) => {
                self.current_mid = SupportedPrefix::Mid
                    .strip(line)
                    .map(|mid| mid.trim().to_string());
                line.to_string()
            }
            Some(SupportedPrefix::Fmtp) => self.rewrite_fmtp(line).unwrap_or_else(|| line.to_string()),
            _ => line.to_string(),
        }
    }

    /// Rewrite a complete session description
    pub fn write(&mut self, sdp: &str) -> String {
        self.reset();
        lines(sdp)
            .map(|line| self.visit(line))
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR)
    }

    pub fn reset(&mut self) {
        self.current_mid = None;
    }

    fn rewrite_fmtp(&self, line: &str) -> Option<String> {
        let info = self.stereo_info.get(self.current_mid.as_deref()?)?;
        if !info.is_stereo_enabled {
            return None;
        }
        let fmtp_line = FmtpLine::parse(line)?;
        if fmtp_line.payload != info.codec_payload {
            return None;
        }
        fmtp::stereo_line(&fmtp_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(mid: &str, payload: &str, enabled: bool) -> (String, StereoInfo) {
        (
            mid.to_string(),
            StereoInfo {
                mid: mid.to_string(),
                codec_payload: payload.to_string(),
                is_stereo_enabled: enabled,
            },
        )
    }

    fn section(mid: &str, payload: &str, fmtp: &str) -> Vec<String> {
        vec![
            "m=audio 9 UDP/TLS/RTP/SAVPF 111 63".to_string(),
            "c=IN IP4 0.0.0.0".to_string(),
            "a=ice-ufrag:zcgT".to_string(),
            "a=setup:active".to_string(),
            format!("a=mid:{}", mid),
            "a=recvonly".to_string(),
            "a=rtcp-mux".to_string(),
            format!("a=rtpmap:{} opus/48000/2", payload),
            format!("a=fmtp:{} {}", payload, fmtp),
        ]
    }

    #[test]
    fn test_visit_one_mid_enabled() {
        let mut writer = StereoEnableWriter::new([info("0", "111", true)].into_iter().collect());
        let input = section("0", "111", "minptime=10;useinbandfec=1");
        let mut expected = input.clone();
        *expected.last_mut().unwrap() =
            "a=fmtp:111 minptime=10;useinbandfec=1;stereo=1;sprop-stereo=1".to_string();

        let actual: Vec<String> = input.iter().map(|line| writer.visit(line)).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_visit_only_enabled_mid_changes() {
        let mut writer = StereoEnableWriter::new(
            [info("0", "111", false), info("1", "112", true)].into_iter().collect(),
        );
        let mut input = section("0", "111", "minptime=10;useinbandfec=1");
        input.extend(section("1", "112", "minptime=10;useinbandfec=1"));

        let actual: Vec<String> = input.iter().map(|line| writer.visit(line)).collect();
        assert_eq!(actual[8], "a=fmtp:111 minptime=10;useinbandfec=1");
        assert_eq!(actual[17], "a=fmtp:112 minptime=10;useinbandfec=1;stereo=1;sprop-stereo=1");
    }

    #[test]
    fn test_visit_same_payload_in_other_section_untouched() {
        let mut writer = StereoEnableWriter::new([info("1", "111", true)].into_iter().collect());
        let mut input = section("0", "111", "minptime=10");
        input.extend(section("1", "111", "minptime=10"));

        let actual: Vec<String> = input.iter().map(|line| writer.visit(line)).collect();
        assert_eq!(actual[8], "a=fmtp:111 minptime=10");
        assert_eq!(actual[17], "a=fmtp:111 minptime=10;stereo=1;sprop-stereo=1");
    }

    #[test]
    fn test_apply_updates_replaces_keyed_lines_only() {
        let sdp = "m=audio 9 RTP 111\r\na=mid:0\r\na=fmtp:111 minptime=10\r\na=rtcp-mux\r\n";
        let replacements: FmtpLineReplacements = [(
            "a=fmtp:111 minptime=10".to_string(),
            "a=fmtp:111 minptime=10;stereo=1;sprop-stereo=1".to_string(),
        )]
        .into_iter()
        .collect();

        let output = apply_stereo_updates(sdp, &replacements);
        assert_eq!(
            output,
            "m=audio 9 RTP 111\r\na=mid:0\r\na=fmtp:111 minptime=10;stereo=1;sprop-stereo=1\r\na=rtcp-mux\r\n"
        );
    }

    #[test]
    fn test_section_updates_skip_sections_not_found() {
        let mut input = section("0", "111", "minptime=10");
        input.extend(section("1", "111", "minptime=10"));
        let sdp = input.join(LINE_SEPARATOR);
        let found: HashMap<String, StereoInfo> = [info("1", "111", false)].into_iter().collect();
        let replacements: FmtpLineReplacements = [(
            "a=fmtp:111 minptime=10".to_string(),
            "a=fmtp:111 minptime=10;stereo=1;sprop-stereo=1".to_string(),
        )]
        .into_iter()
        .collect();

        let output = apply_section_stereo_updates(&sdp, &found, &replacements);
        let actual: Vec<&str> = lines(&output).collect();
        assert_eq!(actual[8], "a=fmtp:111 minptime=10");
        assert_eq!(actual[17], "a=fmtp:111 minptime=10;stereo=1;sprop-stereo=1");
    }

    #[test]
    fn test_apply_updates_empty_map_is_identity() {
        let sdp = "v=0\r\nm=audio 9 RTP 111\r\n\r\n";
        assert_eq!(apply_stereo_updates(sdp, &FmtpLineReplacements::new()), sdp);
    }
}
