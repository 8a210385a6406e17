use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rtc_audio_store::sdp::{self, RtpMapVisitor, StereoEnableVisitor};

/// Offer with `sections` audio sections followed by one video section
fn offer(sections: usize) -> String {
    let mut sdp = String::from("v=0\r\no=- 46117317 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n");
    for mid in 0..sections {
        sdp.push_str("m=audio 9 UDP/TLS/RTP/SAVPF 111 63 9 0 8 13 110 126\r\n");
        sdp.push_str("c=IN IP4 0.0.0.0\r\na=rtcp:9 IN IP4 0.0.0.0\r\n");
        sdp.push_str(&format!("a=mid:{mid}\r\n"));
        sdp.push_str("a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n");
        sdp.push_str("a=sendrecv\r\na=rtcp-mux\r\n");
        sdp.push_str("a=rtpmap:111 opus/48000/2\r\n");
        sdp.push_str("a=rtcp-fb:111 transport-cc\r\n");
        sdp.push_str("a=fmtp:111 minptime=10;useinbandfec=1\r\n");
        sdp.push_str("a=rtpmap:63 red/48000/2\r\na=fmtp:63 111/111\r\n");
        sdp.push_str("a=rtpmap:9 G722/8000\r\na=rtpmap:0 PCMU/8000\r\na=rtpmap:8 PCMA/8000\r\n");
    }
    sdp.push_str(&format!("m=video 9 UDP/TLS/RTP/SAVPF 96\r\na=mid:{sections}\r\na=rtpmap:96 VP8/90000\r\n"));
    sdp
}

fn benchmark_enable_stereo(c: &mut Criterion) {
    let mut group = c.benchmark_group("enable_stereo");

    for sections in [1, 8] {
        let mono = offer(sections);
        let stereo = sdp::enable_stereo(&mono);

        group.bench_function(format!("mono_{sections}_sections"), |b| {
            b.iter(|| black_box(sdp::enable_stereo(black_box(&mono))))
        });

        group.bench_function(format!("already_stereo_{sections}_sections"), |b| {
            b.iter(|| black_box(sdp::enable_stereo(black_box(&stereo))))
        });
    }

    group.finish();
}

fn benchmark_visitors(c: &mut Criterion) {
    let sdp = offer(8);
    let mut group = c.benchmark_group("visitors");

    group.bench_function("rtpmap", |b| {
        b.iter(|| {
            let mut visitor = RtpMapVisitor::new();
            sdp::visit_lines(black_box(&sdp), &mut [&mut visitor]);
            black_box(visitor.payload_type("opus"))
        })
    });

    group.bench_function("stereo_enable", |b| {
        b.iter(|| {
            let mut visitor = StereoEnableVisitor::new();
            sdp::visit_lines(black_box(&sdp), &mut [&mut visitor]);
            black_box(visitor.replacements().len())
        })
    });

    group.finish();
}

fn benchmark_mirror_stereo(c: &mut Criterion) {
    let remote = sdp::enable_stereo(&offer(4));
    let local = offer(4);

    c.bench_function("mirror_stereo_4_sections", |b| {
        b.iter(|| black_box(sdp::mirror_stereo(black_box(&remote), black_box(&local))))
    });
}

criterion_group!(
    benches,
    benchmark_enable_stereo,
    benchmark_visitors,
    benchmark_mirror_stereo
);
criterion_main!(benches);
