//! Demuxed packets.

/// One encoded packet as read from the input.
///
/// Timestamps are in the ticks of whichever time base the packet currently
/// belongs to: the input track's when read, the output stream's after
/// rescaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Index of the input track this packet belongs to.
    pub track_index: usize,
    pub pts: Option<i64>,
    pub dts: Option<i64>,
    /// Duration in ticks, 0 when unknown.
    pub duration: i64,
    pub is_keyframe: bool,
    pub data: Vec<u8>,
}

impl Packet {
    /// Create a packet with `dts == pts`, no duration and no payload.
    pub fn new(track_index: usize, pts: Option<i64>, is_keyframe: bool) -> Self {
        Self {
            track_index,
            pts,
            dts: pts,
            duration: 0,
            is_keyframe,
            data: Vec::new(),
        }
    }

    pub fn with_dts(mut self, dts: Option<i64>) -> Self {
        self.dts = dts;
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
