//! Governing track selection and the frame clock.

use segmenter_common::{Error, MediaKind, Result, StreamTime, TrackDescriptor};

/// The tracks that are segmented: the first video track and the first audio
/// track of the input. Every other track is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoverningTracks {
    video: Option<TrackDescriptor>,
    audio: Option<TrackDescriptor>,
}

impl GoverningTracks {
    /// Pick the first video and first audio track.
    ///
    /// Fails with [`Error::Format`] when the input has neither.
    pub fn select(tracks: &[TrackDescriptor]) -> Result<Self> {
        let video = tracks.iter().find(|t| t.kind == MediaKind::Video).cloned();
        let audio = tracks.iter().find(|t| t.kind == MediaKind::Audio).cloned();

        if video.is_none() && audio.is_none() {
            return Err(Error::format(format!(
                "input has no audio or video track ({} tracks found)",
                tracks.len()
            )));
        }

        Ok(Self { video, audio })
    }

    pub fn video(&self) -> Option<&TrackDescriptor> {
        self.video.as_ref()
    }

    pub fn audio(&self) -> Option<&TrackDescriptor> {
        self.audio.as_ref()
    }

    /// Governing tracks, video first.
    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.video.iter().chain(self.audio.iter())
    }

    /// The governing track with this input index, if any.
    pub fn get(&self, track_index: usize) -> Option<&TrackDescriptor> {
        self.iter().find(|t| t.index == track_index)
    }

    pub fn contains(&self, track_index: usize) -> bool {
        self.get(track_index).is_some()
    }

    /// Input index of the track whose keyframes may start a segment: video
    /// when present, audio otherwise.
    pub fn cut_track(&self) -> usize {
        match (&self.video, &self.audio) {
            (Some(video), _) => video.index,
            (None, Some(audio)) => audio.index,
            // select() guarantees at least one track
            (None, None) => usize::MAX,
        }
    }
}

/// Latest presentation time per governing track.
#[derive(Debug, Clone)]
pub(crate) struct FrameClock {
    video: Option<Option<StreamTime>>,
    audio: Option<Option<StreamTime>>,
    latest_end: Option<StreamTime>,
}

impl FrameClock {
    pub(crate) fn new(governing: &GoverningTracks) -> Self {
        Self {
            video: governing.video().map(|_| None),
            audio: governing.audio().map(|_| None),
            latest_end: None,
        }
    }

    /// Record a packet's presentation time and the time its payload ends.
    pub(crate) fn update(&mut self, kind: MediaKind, time: StreamTime, end: StreamTime) {
        let slot = match kind {
            MediaKind::Video => &mut self.video,
            MediaKind::Audio => &mut self.audio,
            MediaKind::Other => return,
        };
        if let Some(latest) = slot {
            *latest = Some(time);
        }

        if self.latest_end.map_or(true, |current| end > current) {
            self.latest_end = Some(end);
        }
    }

    /// The minimum across governing tracks that have produced a timestamp.
    pub(crate) fn frame_time(&self) -> StreamTime {
        [self.video, self.audio]
            .into_iter()
            .flatten()
            .flatten()
            .min()
            .unwrap_or(StreamTime::ZERO)
    }

    /// End of the latest packet seen on any governing track.
    pub(crate) fn latest_end(&self) -> Option<StreamTime> {
        self.latest_end
    }
}
