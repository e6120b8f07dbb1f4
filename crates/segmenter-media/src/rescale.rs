//! Timestamp rescaling between input and output time bases.
//!
//! Rescaling is exact: `ts × from / to` is evaluated in 128-bit integers and
//! rounded to the nearest tick (ties away from zero) once, at the end.
//! Absolute timestamps are rescaled independently, so no error accumulates
//! over a long stream.

use segmenter_common::{Packet, Rational, StreamTime, TrackDescriptor};
use std::cmp::Ordering;

/// Pick the time base a track's packet timestamps are interpreted in.
///
/// The decoder time base scaled by ticks per frame wins when it is coarser
/// than the stream time base and the stream time base is finer than one
/// millisecond. Otherwise the stream time base is used.
pub fn effective_time_base(
    codec_time_base: Rational,
    ticks_per_frame: i32,
    stream_time_base: Rational,
) -> Rational {
    let Some(frame_base) = codec_time_base.checked_mul_int(ticks_per_frame.max(1)) else {
        return stream_time_base;
    };

    if frame_base.is_valid()
        && stream_time_base.is_valid()
        && frame_base.cmp_value(&stream_time_base) == Ordering::Greater
        && stream_time_base.cmp_value(&Rational::MILLISECOND) == Ordering::Less
    {
        frame_base
    } else {
        stream_time_base
    }
}

/// Rescale `ts` from one time base to another.
///
/// Invalid time bases leave the value unchanged. Results outside the `i64`
/// range saturate.
pub fn rescale(ts: i64, from: Rational, to: Rational) -> i64 {
    if !from.is_valid() || !to.is_valid() {
        return ts;
    }

    let num = i128::from(ts) * i128::from(from.num) * i128::from(to.den);
    let den = i128::from(from.den) * i128::from(to.num);
    let value = div_round_half_away(num, den);

    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// `num / den` rounded to nearest, ties away from zero. `den` must be positive.
fn div_round_half_away(num: i128, den: i128) -> i128 {
    let quotient = num / den;
    let remainder = num % den;
    if 2 * remainder.abs() >= den {
        quotient + num.signum()
    } else {
        quotient
    }
}

/// Converts one track's packets from its effective input time base into the
/// output stream's time base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampRescaler {
    input: Rational,
    output: Rational,
}

impl TimestampRescaler {
    pub fn new(input: Rational, output: Rational) -> Self {
        Self { input, output }
    }

    /// Build a rescaler for `track`, choosing its effective input time base.
    pub fn for_track(track: &TrackDescriptor, output: Rational) -> Self {
        let input = effective_time_base(
            track.codec_time_base,
            track.ticks_per_frame,
            track.time_base,
        );
        Self::new(input, output)
    }

    pub fn input_time_base(&self) -> Rational {
        self.input
    }

    pub fn output_time_base(&self) -> Rational {
        self.output
    }

    /// Interpret input ticks as a stream time.
    pub fn stream_time(&self, ticks: i64) -> StreamTime {
        StreamTime::new(ticks, self.input)
    }

    /// Rescale input ticks to output ticks.
    pub fn rescale(&self, ticks: i64) -> i64 {
        rescale(ticks, self.input, self.output)
    }

    /// Rewrite the packet's pts, dts and duration into output ticks.
    ///
    /// Returns the packet's presentation time in stream time, or `None` when
    /// the packet carries no pts.
    pub fn rescale_packet(&self, packet: &mut Packet) -> Option<StreamTime> {
        let stream_time = packet.pts.map(|pts| self.stream_time(pts));

        packet.pts = packet.pts.map(|pts| self.rescale(pts));
        packet.dts = packet.dts.map(|dts| self.rescale(dts));
        if packet.duration > 0 {
            packet.duration = self.rescale(packet.duration);
        }

        stream_time
    }
}
