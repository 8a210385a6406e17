//! SDP line visitors

pub mod rtpmap;
pub mod stereo;

pub use rtpmap::RtpMapVisitor;
pub use stereo::{StereoEnableVisitor, StereoInfo};

/// Split an `a=rtpmap:` value into payload and lowercased codec name.
///
/// `111 opus/48000/2` yields `("111", "opus")`.
pub(crate) fn parse_rtpmap(value: &str) -> Option<(&str, String)> {
    let (payload, encoding) = value.split_once(' ')?;
    let codec = encoding.split('/').next()?.trim();
    if payload.is_empty() || codec.is_empty() {
        return None;
    }
    Some((payload, codec.to_ascii_lowercase()))
}
