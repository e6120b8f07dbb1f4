//! Segmenter-Common: shared types used across the segmenter crates.
//!
//! This crate provides:
//! - [`Rational`]: FFmpeg-style time base fractions
//! - [`StreamTime`]: exact rational timestamps (`ticks × time_base`)
//! - [`TrackDescriptor`] and [`MediaKind`]: what the demuxer reports per track
//! - [`Packet`]: one demuxed, still-encoded packet
//! - [`Error`] and [`Result`]: the error type shared by every crate

pub mod error;
pub mod packet;
pub mod rational;
pub mod time;
pub mod track;

pub use error::{Error, Result};
pub use packet::Packet;
pub use rational::Rational;
pub use time::StreamTime;
pub use track::{MediaKind, TrackDescriptor};
