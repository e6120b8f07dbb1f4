//! Benchmark the segmentation loop and its hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use segmenter_common::{
    MediaKind, Packet, Rational, Result, StreamTime, TrackDescriptor,
};
use segmenter_media::{
    rescale, FinalSegmentPolicy, PacketSource, PlaylistOptions, PlaylistWriter, ReadEvent,
    SegmentBoundaryState, SegmentMuxer, Segmenter, SegmenterOptions,
};
use std::path::Path;

const VIDEO_TB: Rational = Rational::new(1, 90000);
const AUDIO_TB: Rational = Rational::new(1, 48000);

/// Interleaved 25 fps video (2s GOPs) and AAC audio.
fn make_packets(seconds: i64) -> Vec<Packet> {
    let video = (0..seconds * 25).map(|i| {
        let pts = i * 3_600;
        (StreamTime::new(pts, VIDEO_TB), Packet::new(0, Some(pts), i % 50 == 0).with_duration(3_600))
    });
    let audio = (0..seconds * 48_000 / 1_024).map(|i| {
        let pts = i * 1_024;
        (StreamTime::new(pts, AUDIO_TB), Packet::new(1, Some(pts), true).with_duration(1_024))
    });

    let mut packets: Vec<_> = video.chain(audio).collect();
    packets.sort_by(|a, b| a.0.cmp(&b.0));
    packets.into_iter().map(|(_, p)| p).collect()
}

struct VecSource {
    tracks: Vec<TrackDescriptor>,
    packets: std::vec::IntoIter<Packet>,
}

impl PacketSource for VecSource {
    fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }

    fn read_packet(&mut self) -> ReadEvent {
        match self.packets.next() {
            Some(packet) => ReadEvent::Packet(packet),
            None => ReadEvent::EndOfStream,
        }
    }

    fn duration(&self) -> Option<StreamTime> {
        None
    }
}

/// Discards everything it is given.
struct NullMuxer;

impl SegmentMuxer for NullMuxer {
    fn open_segment(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn output_time_base(&self, _track_index: usize) -> Option<Rational> {
        Some(VIDEO_TB)
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        black_box(packet);
        Ok(())
    }

    fn close_segment(&mut self) -> Result<()> {
        Ok(())
    }
}

fn bench_rescale(c: &mut Criterion) {
    c.bench_function("rescale_48k_to_90k", |b| {
        b.iter(|| rescale(black_box(123_456_789), AUDIO_TB, VIDEO_TB));
    });
}

fn bench_boundary(c: &mut Criterion) {
    let times: Vec<StreamTime> = (0..90_000).map(|i| StreamTime::new(i * 3_600, VIDEO_TB)).collect();

    c.bench_function("boundary_1h_video", |b| {
        b.iter(|| {
            let mut state = SegmentBoundaryState::new(6.0).unwrap();
            for (i, time) in times.iter().enumerate() {
                black_box(state.evaluate(*time, i % 50 == 0, true));
            }
        });
    });
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmenter_run");
    let dir = tempfile::tempdir().unwrap();
    let tracks = vec![
        TrackDescriptor::new(0, MediaKind::Video, VIDEO_TB),
        TrackDescriptor::new(1, MediaKind::Audio, AUDIO_TB),
    ];

    // 10 minutes of audio and video.
    let packets_10min = make_packets(600);
    group.bench_function("10min_av", |b| {
        b.iter(|| {
            let source = VecSource {
                tracks: tracks.clone(),
                packets: packets_10min.clone().into_iter(),
            };
            let playlist = PlaylistWriter::new(
                dir.path().join("bench.m3u8"),
                PlaylistOptions::new(6.0, "seg", "ts", ""),
            )
            .unwrap();
            let options = SegmenterOptions {
                final_segment: FinalSegmentPolicy::Nominal,
                output_dir: Some(dir.path().to_path_buf()),
            };
            let mut segmenter = Segmenter::new(source, NullMuxer, playlist, options).unwrap();
            black_box(segmenter.run().unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_rescale, bench_boundary, bench_run);
criterion_main!(benches);
