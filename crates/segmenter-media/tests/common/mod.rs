//! Synthetic media pipeline for driving the segmenter in tests.

#![allow(dead_code)]

use segmenter_common::{
    Error, MediaKind, Packet, Rational, Result, StreamTime, TrackDescriptor,
};
use segmenter_media::{
    FinalSegmentPolicy, PacketSource, PlaylistOptions, PlaylistWriter, ReadEvent, SegmentMuxer,
    Segmenter, SegmenterOptions,
};
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const VIDEO_TB: Rational = Rational::new(1, 90000);
pub const AUDIO_TB: Rational = Rational::new(1, 48000);

pub fn video_track(index: usize) -> TrackDescriptor {
    TrackDescriptor::new(index, MediaKind::Video, VIDEO_TB).with_codec("h264")
}

pub fn audio_track(index: usize) -> TrackDescriptor {
    TrackDescriptor::new(index, MediaKind::Audio, AUDIO_TB).with_codec("aac")
}

pub fn subtitle_track(index: usize) -> TrackDescriptor {
    TrackDescriptor::new(index, MediaKind::Other, Rational::new(1, 1000)).with_codec("mov_text")
}

/// `count` frames of `frame_ticks` each; frame `i` is a keyframe when
/// `is_key(i)` holds.
pub fn frames(
    track_index: usize,
    frame_ticks: i64,
    count: usize,
    is_key: impl Fn(usize) -> bool,
) -> Vec<Packet> {
    (0..count)
        .map(|i| {
            Packet::new(track_index, Some(i as i64 * frame_ticks), is_key(i))
                .with_duration(frame_ticks)
                .with_data(vec![i as u8; 16])
        })
        .collect()
}

/// Like [`frames`], with the first frame at `start_ticks` instead of zero.
pub fn frames_from(
    track_index: usize,
    start_ticks: i64,
    frame_ticks: i64,
    count: usize,
    is_key: impl Fn(usize) -> bool,
) -> Vec<Packet> {
    frames(track_index, frame_ticks, count, is_key)
        .into_iter()
        .map(|mut p| {
            p.pts = p.pts.map(|pts| pts + start_ticks);
            p.dts = p.dts.map(|dts| dts + start_ticks);
            p
        })
        .collect()
}

/// Merge per-track packet lists into presentation order.
pub fn interleave(streams: Vec<(Vec<Packet>, Rational)>) -> Vec<Packet> {
    let mut timed: Vec<(StreamTime, Packet)> = streams
        .into_iter()
        .flat_map(|(packets, tb)| {
            packets
                .into_iter()
                .map(move |p| (StreamTime::new(p.pts.unwrap_or(0), tb), p))
        })
        .collect();
    timed.sort_by(|a, b| a.0.cmp(&b.0));
    timed.into_iter().map(|(_, p)| p).collect()
}

pub struct FakeSource {
    tracks: Vec<TrackDescriptor>,
    events: VecDeque<ReadEvent>,
    duration: Option<StreamTime>,
    start_time: Option<StreamTime>,
    pub reads: usize,
    /// Tracks the segmenter asked to discard, in order.
    pub discarded: Vec<usize>,
}

impl FakeSource {
    pub fn new(tracks: Vec<TrackDescriptor>, packets: Vec<Packet>) -> Self {
        Self {
            tracks,
            events: packets.into_iter().map(ReadEvent::Packet).collect(),
            duration: None,
            start_time: None,
            reads: 0,
            discarded: Vec::new(),
        }
    }

    pub fn from_events(tracks: Vec<TrackDescriptor>, events: Vec<ReadEvent>) -> Self {
        Self {
            tracks,
            events: events.into(),
            duration: None,
            start_time: None,
            reads: 0,
            discarded: Vec::new(),
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(StreamTime::from_micros((seconds * 1_000_000.0).round() as i64));
        self
    }

    pub fn with_start_time(mut self, seconds: f64) -> Self {
        self.start_time = Some(StreamTime::from_micros((seconds * 1_000_000.0).round() as i64));
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl PacketSource for FakeSource {
    fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }

    fn read_packet(&mut self) -> ReadEvent {
        self.reads += 1;
        self.events.pop_front().unwrap_or(ReadEvent::EndOfStream)
    }

    fn duration(&self) -> Option<StreamTime> {
        self.duration
    }

    fn start_time(&self) -> Option<StreamTime> {
        self.start_time
    }

    fn discard_track(&mut self, track_index: usize) {
        self.discarded.push(track_index);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MuxEvent {
    Open(PathBuf),
    Write {
        track: usize,
        pts: Option<i64>,
        keyframe: bool,
    },
    Close,
}

/// Records every call and writes packet payloads into real files.
pub struct FakeMuxer {
    time_bases: HashMap<usize, Rational>,
    current: Option<File>,
    pub events: Vec<MuxEvent>,
    opens: usize,
    writes: usize,
    /// Fail the n-th open (1-based) with an I/O error.
    pub fail_open_at: Option<usize>,
    /// Fail the n-th write (1-based) with an I/O error.
    pub fail_write_at: Option<usize>,
    /// Reject packets with this pts as malformed.
    pub reject_pts: Option<i64>,
}

impl FakeMuxer {
    /// Every track is written with a 1/90000 time base.
    pub fn new(tracks: &[TrackDescriptor]) -> Self {
        Self {
            time_bases: tracks.iter().map(|t| (t.index, VIDEO_TB)).collect(),
            current: None,
            events: Vec::new(),
            opens: 0,
            writes: 0,
            fail_open_at: None,
            fail_write_at: None,
            reject_pts: None,
        }
    }

    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MuxEvent::Open(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// The first packet written after each open, in order.
    pub fn first_writes(&self) -> Vec<MuxEvent> {
        let mut firsts = Vec::new();
        let mut expecting = false;
        for event in &self.events {
            match event {
                MuxEvent::Open(_) => expecting = true,
                MuxEvent::Write { .. } if expecting => {
                    firsts.push(event.clone());
                    expecting = false;
                }
                _ => {}
            }
        }
        firsts
    }
}

impl SegmentMuxer for FakeMuxer {
    fn open_segment(&mut self, path: &Path) -> Result<()> {
        assert!(self.current.is_none(), "segment opened while another is open");
        self.opens += 1;
        if self.fail_open_at == Some(self.opens) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("cannot create {}", path.display()),
            )));
        }

        self.current = Some(File::create(path)?);
        self.events.push(MuxEvent::Open(path.to_path_buf()));
        Ok(())
    }

    fn output_time_base(&self, track_index: usize) -> Option<Rational> {
        self.time_bases.get(&track_index).copied()
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        let file = self
            .current
            .as_mut()
            .ok_or_else(|| Error::mux("no segment is open"))?;

        self.writes += 1;
        if self.fail_write_at == Some(self.writes) {
            return Err(Error::Io(std::io::Error::other("no space left on device")));
        }
        if packet.pts.is_some() && packet.pts == self.reject_pts {
            return Err(Error::mux("non-monotonic dts"));
        }

        file.write_all(&packet.data)?;
        self.events.push(MuxEvent::Write {
            track: packet.track_index,
            pts: packet.pts,
            keyframe: packet.is_keyframe,
        });
        Ok(())
    }

    fn close_segment(&mut self) -> Result<()> {
        let file = self
            .current
            .take()
            .ok_or_else(|| Error::mux("no segment is open"))?;
        file.sync_all()?;
        self.events.push(MuxEvent::Close);
        Ok(())
    }
}

/// Build a segmenter writing `index.m3u8` and `seg-N.ts` files into `dir`.
pub fn segmenter(
    dir: &Path,
    source: FakeSource,
    options: PlaylistOptions,
    final_segment: FinalSegmentPolicy,
) -> Segmenter<FakeSource, FakeMuxer> {
    let muxer = FakeMuxer::new(source.tracks());
    segmenter_with_muxer(dir, source, muxer, options, final_segment)
}

pub fn segmenter_with_muxer(
    dir: &Path,
    source: FakeSource,
    muxer: FakeMuxer,
    options: PlaylistOptions,
    final_segment: FinalSegmentPolicy,
) -> Segmenter<FakeSource, FakeMuxer> {
    let playlist = PlaylistWriter::new(dir.join("index.m3u8"), options).unwrap();
    let options = SegmenterOptions {
        final_segment,
        output_dir: Some(dir.to_path_buf()),
    };
    Segmenter::new(source, muxer, playlist, options).unwrap()
}

/// `#EXTINF` durations of a playlist.
pub fn durations(playlist: &str) -> Vec<f64> {
    playlist
        .lines()
        .filter_map(|line| line.strip_prefix("#EXTINF:"))
        .map(|rest| rest.trim_end_matches(',').parse().unwrap())
        .collect()
}

/// Segment URIs of a playlist.
pub fn uris(playlist: &str) -> Vec<String> {
    playlist
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
