//! Video input and frame handling.
//!
//! Decoding is delegated to an external capability behind the
//! [`VideoSource`] and [`VideoOpener`] traits. The ffmpeg-backed
//! implementation drives the `ffmpeg` binary; [`SyntheticVideo`] renders
//! frames in memory for tests and demos.

mod ffmpeg;
mod frame;
mod video;

pub use ffmpeg::{FfmpegOpener, FfmpegVideo};
pub use frame::Frame;
pub use video::{SourceError, SyntheticOpener, SyntheticVideo, VideoOpener, VideoSource};
