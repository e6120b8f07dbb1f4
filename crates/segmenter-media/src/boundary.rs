//! Segment boundary decisions.
//!
//! A new segment starts at an eligible keyframe once at least the target
//! duration has elapsed since the previous boundary. Segments therefore run
//! at least as long as the target, and longer when keyframes are sparse.
//!
//! Inputs rarely start at time zero, so the first segment is measured from
//! the first frame time the state sees rather than from zero.

use segmenter_common::{Error, Result, StreamTime};

/// How the last segment's duration is reported when the input does not
/// declare its total duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum FinalSegmentPolicy {
    /// Report the configured target duration.
    #[default]
    Nominal,
    /// Report the time actually covered by the packets written since the
    /// last boundary.
    Measured,
}

/// Result of evaluating one packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryDecision {
    /// Keep writing into the current segment.
    Continue,
    /// Close the current segment, which lasted `duration` seconds, and start
    /// a new one with this packet.
    Cut { duration: f64 },
}

/// Tracks the last boundary and decides where the next one goes.
#[derive(Debug, Clone)]
pub struct SegmentBoundaryState {
    /// Start of the first segment, set by the first evaluated packet.
    first_boundary: Option<StreamTime>,
    last_boundary: Option<StreamTime>,
    target_duration: f64,
}

impl SegmentBoundaryState {
    /// A state with the given target duration in seconds. The first segment
    /// starts at the first frame time passed to [`evaluate`](Self::evaluate).
    pub fn new(target_duration: f64) -> Result<Self> {
        if !target_duration.is_finite() || target_duration <= 0.0 {
            return Err(Error::invalid_argument(format!(
                "segment duration must be a positive number of seconds, got {}",
                target_duration
            )));
        }

        Ok(Self {
            first_boundary: None,
            last_boundary: None,
            target_duration,
        })
    }

    pub fn target_duration(&self) -> f64 {
        self.target_duration
    }

    /// Stream time at which the first segment started, once known.
    pub fn first_boundary(&self) -> Option<StreamTime> {
        self.first_boundary
    }

    /// Stream time at which the current segment started, once known.
    pub fn last_boundary(&self) -> Option<StreamTime> {
        self.last_boundary
    }

    /// Open the first segment at `time`, typically the input's declared
    /// start. Does nothing once the first segment has started.
    pub fn start_at(&mut self, time: StreamTime) {
        if self.last_boundary.is_none() {
            self.first_boundary = Some(time);
            self.last_boundary = Some(time);
        }
    }

    /// Decide whether the packet at `frame_time` starts a new segment.
    ///
    /// The first packet evaluated opens the first segment and never cuts.
    /// After that only keyframes on the track allowed to cut (`eligible`)
    /// are considered.
    pub fn evaluate(
        &mut self,
        frame_time: StreamTime,
        is_keyframe: bool,
        eligible: bool,
    ) -> BoundaryDecision {
        let Some(last_boundary) = self.last_boundary else {
            self.start_at(frame_time);
            return BoundaryDecision::Continue;
        };

        if !is_keyframe || !eligible {
            return BoundaryDecision::Continue;
        }

        let elapsed = frame_time.seconds_since(last_boundary);
        if elapsed >= self.target_duration {
            self.last_boundary = Some(frame_time);
            BoundaryDecision::Cut { duration: elapsed }
        } else {
            BoundaryDecision::Continue
        }
    }

    /// Duration of the segment that is open when the input ends.
    ///
    /// `total` is the declared duration of the whole input and wins when
    /// known. It counts from `start`, the input's declared start time, or
    /// from the first boundary when the input declares none.
    /// `last_frame_end` is the end of the latest packet written, used by
    /// [`FinalSegmentPolicy::Measured`].
    pub fn final_duration(
        &self,
        start: Option<StreamTime>,
        total: Option<StreamTime>,
        last_frame_end: Option<StreamTime>,
        policy: FinalSegmentPolicy,
    ) -> f64 {
        let origin = start.or(self.first_boundary).unwrap_or(StreamTime::ZERO);
        let last_boundary = self.last_boundary.unwrap_or(origin);

        if let Some(total) = total {
            // end - last = total - (last - origin)
            return (total.as_secs_f64() - last_boundary.seconds_since(origin)).max(0.0);
        }

        match policy {
            FinalSegmentPolicy::Nominal => self.target_duration,
            FinalSegmentPolicy::Measured => last_frame_end
                .map(|end| end.seconds_since(last_boundary).max(0.0))
                .unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segmenter_common::Rational;

    fn secs(value: i64) -> StreamTime {
        StreamTime::new(value, Rational::new(1, 1))
    }

    fn millis(value: i64) -> StreamTime {
        StreamTime::new(value, Rational::new(1, 1000))
    }

    fn started_at(start: StreamTime, target: f64) -> SegmentBoundaryState {
        let mut state = SegmentBoundaryState::new(target).unwrap();
        assert_eq!(state.evaluate(start, true, true), BoundaryDecision::Continue);
        state
    }

    #[test]
    fn test_rejects_bad_durations() {
        assert!(SegmentBoundaryState::new(0.0).is_err());
        assert!(SegmentBoundaryState::new(-1.0).is_err());
        assert!(SegmentBoundaryState::new(f64::NAN).is_err());
        assert!(SegmentBoundaryState::new(f64::INFINITY).is_err());
        assert!(SegmentBoundaryState::new(0.5).is_ok());
    }

    #[test]
    fn test_cuts_only_after_target() {
        let mut state = started_at(secs(0), 5.0);

        assert_eq!(state.evaluate(secs(4), true, true), BoundaryDecision::Continue);
        assert_eq!(
            state.evaluate(secs(6), true, true),
            BoundaryDecision::Cut { duration: 6.0 }
        );
        assert_eq!(state.last_boundary(), Some(secs(6)));
        assert_eq!(
            state.evaluate(secs(11), true, true),
            BoundaryDecision::Cut { duration: 5.0 }
        );
        assert_eq!(state.first_boundary(), Some(secs(0)));
    }

    #[test]
    fn test_first_packet_opens_first_segment() {
        let mut state = SegmentBoundaryState::new(5.0).unwrap();
        assert_eq!(state.last_boundary(), None);

        // A keyframe far from zero starts the first segment instead of
        // closing an empty one.
        assert_eq!(state.evaluate(secs(20), true, true), BoundaryDecision::Continue);
        assert_eq!(state.first_boundary(), Some(secs(20)));
        assert_eq!(state.evaluate(secs(24), true, true), BoundaryDecision::Continue);
        assert_eq!(
            state.evaluate(secs(26), true, true),
            BoundaryDecision::Cut { duration: 6.0 }
        );
    }

    #[test]
    fn test_first_packet_anchors_even_when_not_eligible() {
        let mut state = SegmentBoundaryState::new(1.0).unwrap();
        assert_eq!(state.evaluate(millis(1_400), false, false), BoundaryDecision::Continue);
        assert_eq!(state.first_boundary(), Some(millis(1_400)));
    }

    #[test]
    fn test_start_at_declared_start() {
        let mut state = SegmentBoundaryState::new(5.0).unwrap();
        state.start_at(millis(19_500));
        state.start_at(secs(30));
        assert_eq!(state.first_boundary(), Some(millis(19_500)));

        assert_eq!(state.evaluate(secs(20), true, true), BoundaryDecision::Continue);
        assert_eq!(
            state.evaluate(secs(26), true, true),
            BoundaryDecision::Cut { duration: 6.5 }
        );
    }

    #[test]
    fn test_non_keyframes_never_cut() {
        let mut state = started_at(secs(0), 1.0);
        assert_eq!(state.evaluate(secs(100), false, true), BoundaryDecision::Continue);
        assert_eq!(state.last_boundary(), Some(StreamTime::ZERO));
    }

    #[test]
    fn test_ineligible_keyframes_never_cut() {
        let mut state = started_at(secs(0), 1.0);
        assert_eq!(state.evaluate(secs(100), true, false), BoundaryDecision::Continue);
    }

    #[test]
    fn test_exact_boundary_is_inclusive() {
        let mut state = started_at(secs(0), 2.0);
        assert_eq!(
            state.evaluate(millis(2000), true, true),
            BoundaryDecision::Cut { duration: 2.0 }
        );
    }

    #[test]
    fn test_final_duration_prefers_total() {
        let mut state = started_at(secs(0), 5.0);
        state.evaluate(secs(6), true, true);

        let duration = state.final_duration(
            None,
            Some(StreamTime::from_micros(11_000_000)),
            Some(millis(10_500)),
            FinalSegmentPolicy::Measured,
        );
        assert!((duration - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_final_duration_counts_from_declared_start() {
        // Input declared to start at 1.4s and last 12s, so it ends at 13.4s.
        let mut state = started_at(millis(1_400), 5.0);
        state.evaluate(millis(7_400), true, true);

        let duration = state.final_duration(
            Some(millis(1_400)),
            Some(secs(12)),
            None,
            FinalSegmentPolicy::Nominal,
        );
        assert!((duration - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_final_duration_counts_from_first_boundary_without_start() {
        let mut state = started_at(secs(20), 5.0);
        state.evaluate(secs(26), true, true);

        let duration = state.final_duration(None, Some(secs(12)), None, FinalSegmentPolicy::Nominal);
        assert!((duration - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_final_duration_without_packets() {
        let state = SegmentBoundaryState::new(5.0).unwrap();
        let duration = state.final_duration(None, Some(secs(3)), None, FinalSegmentPolicy::Nominal);
        assert_eq!(duration, 3.0);
    }

    #[test]
    fn test_final_duration_clamps_at_zero() {
        let mut state = started_at(secs(0), 5.0);
        state.evaluate(secs(6), true, true);
        let duration =
            state.final_duration(None, Some(secs(4)), None, FinalSegmentPolicy::Nominal);
        assert_eq!(duration, 0.0);
    }

    #[test]
    fn test_final_duration_policies_without_total() {
        let mut state = started_at(secs(0), 10.0);
        state.evaluate(secs(20), true, true);

        let nominal =
            state.final_duration(None, None, Some(millis(25_300)), FinalSegmentPolicy::Nominal);
        assert_eq!(nominal, 10.0);

        let measured =
            state.final_duration(None, None, Some(millis(25_300)), FinalSegmentPolicy::Measured);
        assert!((measured - 5.3).abs() < 1e-9);

        let empty = state.final_duration(None, None, None, FinalSegmentPolicy::Measured);
        assert_eq!(empty, 0.0);
    }
}
