//! Line dispatch for SDP visitors

use super::{lines, SdpLineVisitor, SupportedPrefix};

/// Feed every line of `sdp` to the visitors that declared its prefix.
///
/// Lines with no known prefix are skipped entirely. Visitors see lines in
/// document order.
pub fn visit_lines(sdp: &str, visitors: &mut [&mut dyn SdpLineVisitor]) {
    for line in lines(sdp) {
        let Some(prefix) = SupportedPrefix::of(line) else {
            continue;
        };
        for visitor in visitors.iter_mut() {
            if visitor.supported_prefixes().contains(&prefix) {
                visitor.visit(line);
            }
        }
    }
}
