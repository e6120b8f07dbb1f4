//! Common error types used throughout segmenter.
//!
//! One error type crosses every crate boundary. The variants follow how the
//! segmentation loop reacts to a failure: argument and format errors abort
//! startup, I/O errors stop writing, mux errors cost a single packet, and
//! playlist errors mean the index can no longer be published.

/// Common error type for segmenter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A malformed or missing command-line argument or option value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input or requested output container could not be opened or
    /// recognized, or contains no usable tracks.
    #[error("format error: {0}")]
    Format(String),

    /// Reading, writing, renaming or syncing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The muxer rejected a single packet.
    #[error("mux error: {0}")]
    Mux(String),

    /// The playlist writer was misused or can no longer publish.
    #[error("playlist error: {0}")]
    Playlist(String),
}

impl Error {
    /// Create a new InvalidArgument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new Format error.
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Self::Format(msg.into())
    }

    /// Create a new Mux error.
    pub fn mux<S: Into<String>>(msg: S) -> Self {
        Self::Mux(msg.into())
    }

    /// Create a new Playlist error.
    pub fn playlist<S: Into<String>>(msg: S) -> Self {
        Self::Playlist(msg.into())
    }

    /// Create a new Io error from a message (for library errors carrying no errno).
    pub fn io<S: Into<String>>(msg: S) -> Self {
        Self::Io(std::io::Error::other(msg.into()))
    }

    /// Whether this error came from the filesystem or an output device.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
