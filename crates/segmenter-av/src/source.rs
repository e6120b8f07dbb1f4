//! Demuxing the input with FFmpeg.

use crate::error::from_ffmpeg;
use crate::to_rational;
use ffmpeg_the_third as ffmpeg;
use ffmpeg_the_third::ffi;
use segmenter_common::{Error, MediaKind, Packet, Result, StreamTime, TrackDescriptor};
use segmenter_media::{PacketSource, ReadEvent};
use std::ffi::{c_void, CStr, CString};
use std::ptr;

/// Input location FFmpeg uses for standard input.
const STDIN: &str = "pipe:";

/// Demuxer used when the input's name does not identify one.
pub const FALLBACK_INPUT_FORMAT: &str = "mpegts";

/// An opened input container.
pub struct FfmpegSource {
    input: ffmpeg::format::context::Input,
    tracks: Vec<TrackDescriptor>,
    start_time: Option<StreamTime>,
    duration: Option<StreamTime>,
}

impl FfmpegSource {
    /// Open `input` (a path, a URL, or `-` for standard input).
    ///
    /// `format_hint` forces a demuxer by name; an unknown name is a format
    /// error. Without one the demuxer is picked by the input's extension,
    /// falling back to MPEG-TS.
    pub fn open(input: &str, format_hint: Option<&str>) -> Result<Self> {
        crate::init()?;

        let location = if input == "-" { STDIN } else { input };

        let format_name = match format_hint {
            Some(name) => name.to_string(),
            None => guess_input_format(location).unwrap_or_else(|| {
                tracing::info!(
                    "Could not determine the format of {} from its name, MPEG-TS assumed",
                    location
                );
                FALLBACK_INPUT_FORMAT.to_string()
            }),
        };
        let context = open_with_format(location, &format_name)?;

        let tracks = describe_tracks(&context);
        let duration = match context.duration() {
            d if d > 0 => Some(StreamTime::from_micros(d)),
            _ => None,
        };
        // SAFETY: the context is open and owned by `context`.
        let start = unsafe { (*context.as_ptr()).start_time };
        let start_time = (start != ffi::AV_NOPTS_VALUE).then(|| StreamTime::from_micros(start));

        tracing::info!(
            "Opened {} ({} tracks, duration {})",
            location,
            tracks.len(),
            duration.map_or_else(|| "unknown".to_string(), |d| d.to_string())
        );

        Ok(Self {
            input: context,
            tracks,
            start_time,
            duration,
        })
    }

    /// An owned copy of the codec parameters of the input stream with this
    /// index.
    pub(crate) fn codec_parameters(&self, index: usize) -> Result<ffmpeg::codec::Parameters> {
        let stream = self
            .input
            .stream(index)
            .ok_or_else(|| Error::format(format!("input has no stream {}", index)))?;

        let mut parameters = ffmpeg::codec::Parameters::new();
        // SAFETY: both parameter sets are valid for the duration of the call;
        // the copy is owned by `parameters`.
        let ret = unsafe {
            ffi::avcodec_parameters_copy(parameters.as_mut_ptr(), (*stream.as_ptr()).codecpar)
        };
        if ret < 0 {
            return Err(from_ffmpeg(
                ffmpeg::Error::from(ret),
                "failed to copy codec parameters",
            ));
        }
        Ok(parameters)
    }
}

/// Name of the first demuxer whose extensions match `location`.
pub fn guess_input_format(location: &str) -> Option<String> {
    let c_location = CString::new(location).ok()?;
    let mut opaque: *mut c_void = ptr::null_mut();

    // SAFETY: av_demuxer_iterate yields static demuxer descriptions until it
    // returns null; their name and extensions are static C strings or null.
    unsafe {
        loop {
            let format = ffi::av_demuxer_iterate(&mut opaque);
            if format.is_null() {
                return None;
            }
            let extensions = (*format).extensions;
            if extensions.is_null() || ffi::av_match_ext(c_location.as_ptr(), extensions) == 0 {
                continue;
            }
            // Demuxer names may list aliases, e.g. "mov,mp4,m4a".
            let names = CStr::from_ptr((*format).name).to_string_lossy();
            return names.split(',').next().map(str::to_string);
        }
    }
}

/// Open with an explicitly named demuxer.
fn open_with_format(location: &str, format_name: &str) -> Result<ffmpeg::format::context::Input> {
    let c_format = CString::new(format_name)
        .map_err(|_| Error::invalid_argument(format!("invalid input format name {:?}", format_name)))?;
    let c_location = CString::new(location)
        .map_err(|_| Error::invalid_argument(format!("invalid input location {:?}", location)))?;

    // SAFETY: every pointer passed to FFmpeg is either null or valid for the
    // duration of the call; on failure the context is released before return.
    unsafe {
        let format = ffi::av_find_input_format(c_format.as_ptr());
        if format.is_null() {
            return Err(Error::format(format!(
                "input format {:?} is not supported",
                format_name
            )));
        }

        let mut context = ptr::null_mut();
        let ret = ffi::avformat_open_input(&mut context, c_location.as_ptr(), format, ptr::null_mut());
        if ret < 0 {
            return Err(from_ffmpeg(
                ffmpeg::Error::from(ret),
                &format!("failed to open input {} as {}", location, format_name),
            ));
        }

        let ret = ffi::avformat_find_stream_info(context, ptr::null_mut());
        if ret < 0 {
            ffi::avformat_close_input(&mut context);
            return Err(from_ffmpeg(
                ffmpeg::Error::from(ret),
                &format!("failed to read stream info from {}", location),
            ));
        }

        Ok(ffmpeg::format::context::Input::wrap(context))
    }
}

fn describe_tracks(input: &ffmpeg::format::context::Input) -> Vec<TrackDescriptor> {
    input
        .streams()
        .map(|stream| {
            let parameters = stream.parameters();
            let kind = match parameters.medium() {
                ffmpeg::media::Type::Video => MediaKind::Video,
                ffmpeg::media::Type::Audio => MediaKind::Audio,
                _ => MediaKind::Other,
            };

            // Codec parameters carry no decoder time base, so packet
            // timestamps are interpreted in the stream time base.
            let track = TrackDescriptor::new(stream.index(), kind, to_rational(stream.time_base()))
                .with_codec(parameters.id().name());

            tracing::debug!(
                "Input stream {}: {} {} (time base {})",
                track.index,
                track.kind,
                track.codec_id,
                track.time_base
            );
            track
        })
        .collect()
}

impl PacketSource for FfmpegSource {
    fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }

    fn read_packet(&mut self) -> ReadEvent {
        let mut packet = ffmpeg::Packet::empty();

        match packet.read(&mut self.input) {
            Ok(()) => ReadEvent::Packet(
                Packet::new(packet.stream(), packet.pts(), packet.is_key())
                    .with_dts(packet.dts())
                    .with_duration(packet.duration())
                    .with_data(packet.data().unwrap_or_default()),
            ),
            Err(ffmpeg::Error::Eof) => ReadEvent::EndOfStream,
            Err(ffmpeg::Error::Other { errno }) if errno == libc::EAGAIN => ReadEvent::TryAgain,
            Err(e) => ReadEvent::Error(from_ffmpeg(e, "failed to read packet")),
        }
    }

    fn duration(&self) -> Option<StreamTime> {
        self.duration
    }

    fn start_time(&self) -> Option<StreamTime> {
        self.start_time
    }

    fn discard_track(&mut self, track_index: usize) {
        if let Some(mut stream) = self.input.stream_mut(track_index) {
            // SAFETY: the stream belongs to the open input context.
            unsafe {
                (*stream.as_mut_ptr()).discard = ffi::AVDiscard::AVDISCARD_ALL;
            }
            tracing::debug!("Discarding input stream {}", track_index);
        }
    }
}
