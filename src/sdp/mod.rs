//! Session description munging
//!
//! SDP text is never parsed into a full object model. Instead, a set of
//! single-pass line visitors collect the facts they care about (codec
//! payloads, stereo capability per `mid`) and a writer rewrites only the
//! lines that need to change. Everything else is passed through untouched,
//! in its original position.
//!
//! ```text
//!  SDP text ──► parser::visit_lines ──► StereoEnableVisitor ──► found + replacements
//!                                                                       │
//!  SDP text ────────────────────────► writer::apply_section_stereo_updates ──► SDP text
//! ```

pub mod fmtp;
pub mod parser;
pub mod visitors;
pub mod writer;

pub use parser::visit_lines;
pub use visitors::{RtpMapVisitor, StereoEnableVisitor, StereoInfo};
pub use writer::{apply_section_stereo_updates, apply_stereo_updates, FmtpLineReplacements, StereoEnableWriter};

/// Line separator used by WebRTC session descriptions
pub const LINE_SEPARATOR: &str = "\r\n";

/// Line prefixes the visitors know how to interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedPrefix {
    /// `m=` media section header
    Media,
    /// `a=mid:` media identifier
    Mid,
    /// `a=rtpmap:` payload type to codec mapping
    RtpMap,
    /// `a=fmtp:` codec specific parameters
    Fmtp,
}

impl SupportedPrefix {
    pub const ALL: [SupportedPrefix; 4] = [
        SupportedPrefix::Media,
        SupportedPrefix::Mid,
        SupportedPrefix::RtpMap,
        SupportedPrefix::Fmtp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedPrefix::Media => "m=",
            SupportedPrefix::Mid => "a=mid:",
            SupportedPrefix::RtpMap => "a=rtpmap:",
            SupportedPrefix::Fmtp => "a=fmtp:",
        }
    }

    /// Find the prefix a line starts with, if any
    pub fn of(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|prefix| line.starts_with(prefix.as_str()))
    }

    /// Return the line value after this prefix
    pub fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.strip_prefix(self.as_str())
    }
}

/// A stateful, single-pass consumer of SDP lines
///
/// Visitors receive every line they are given and must ignore the ones
/// they don't understand; malformed lines never produce errors.
pub trait SdpLineVisitor {
    /// Prefixes this visitor reacts to
    fn supported_prefixes(&self) -> &'static [SupportedPrefix];

    /// Consume one line
    fn visit(&mut self, line: &str);

    /// Clear all accumulated state so the visitor can be reused
    fn reset(&mut self);
}

/// Split a session description into its lines
pub fn lines(sdp: &str) -> impl Iterator<Item = &str> {
    sdp.split(LINE_SEPARATOR)
}

/// Force `stereo=1;sprop-stereo=1` on every audio section negotiating Opus.
///
/// Returns the input unchanged (byte for byte) when no line needs rewriting.
pub fn enable_stereo(sdp: &str) -> String {
    let mut visitor = StereoEnableVisitor::new();
    visit_lines(sdp, &mut [&mut visitor]);

    if visitor.replacements().is_empty() {
        tracing::trace!("SDP already stereo compliant");
        return sdp.to_owned();
    }

    tracing::debug!(
        sections = visitor.found().len(),
        replacements = visitor.replacements().len(),
        "Enabling stereo on SDP"
    );
    apply_section_stereo_updates(sdp, visitor.found(), visitor.replacements())
}

/// Mirror the remote offer's stereo capability into a local answer.
///
/// Sections of `local_answer` whose `mid` advertised stereo in
/// `remote_offer` get their Opus `fmtp` line made stereo.
pub fn mirror_stereo(remote_offer: &str, local_answer: &str) -> String {
    let mut visitor = StereoEnableVisitor::new();
    visit_lines(remote_offer, &mut [&mut visitor]);

    if !visitor.found().values().any(|info| info.is_stereo_enabled) {
        return local_answer.to_owned();
    }

    let mut writer = StereoEnableWriter::new(visitor.found().clone());
    writer.write(local_answer)
}
