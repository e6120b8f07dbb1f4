//! Mapping FFmpeg errors onto the shared error type.

use ffmpeg_the_third as ffmpeg;
use segmenter_common::Error;
use std::io;

/// Classify an FFmpeg error.
///
/// errno values become I/O errors, except `EINVAL`, which muxers return for
/// a single malformed packet. Missing demuxers, muxers and codecs are format
/// errors.
pub(crate) fn from_ffmpeg(err: ffmpeg::Error, context: &str) -> Error {
    let message = format!("{}: {}", context, err);

    match err {
        ffmpeg::Error::Other { errno } if errno == libc::EINVAL => Error::mux(message),
        ffmpeg::Error::Other { errno } => Error::Io(io::Error::new(
            io::Error::from_raw_os_error(errno).kind(),
            message,
        )),
        ffmpeg::Error::Eof => Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, message)),
        ffmpeg::Error::Exit | ffmpeg::Error::External => Error::io(message),
        ffmpeg::Error::DemuxerNotFound
        | ffmpeg::Error::MuxerNotFound
        | ffmpeg::Error::DecoderNotFound
        | ffmpeg::Error::EncoderNotFound
        | ffmpeg::Error::ProtocolNotFound
        | ffmpeg::Error::StreamNotFound
        | ffmpeg::Error::InvalidData => Error::format(message),
        _ => Error::mux(message),
    }
}
