//! HLS media playlist writing.
//!
//! The [`PlaylistWriter`] appends one entry per completed segment to a hidden
//! temporary file next to the playlist and publishes it with an atomic rename
//! only when the run finishes. With a rolling window it publishes after every
//! segment instead, listing only the most recent entries.

mod render;
mod types;
mod writer;

pub use types::{DurationFormat, PlaylistEntry, PlaylistOptions};
pub use writer::PlaylistWriter;
