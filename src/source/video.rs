//! Video source abstraction.
//!
//! A source is a finite, seekable sequence of frames addressed by playback
//! time. This trait-based abstraction lets the extraction core run against
//! the ffmpeg backend or an in-memory synthetic video.

use super::Frame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while opening or reading a video.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },
    #[error("ffmpeg binary not found; install ffmpeg or add it to PATH")]
    FfmpegMissing,
    #[error("failed to decode frame at {timestamp:.3}s: {reason}")]
    Decode { timestamp: f64, reason: String },
}

impl SourceError {
    pub(crate) fn unavailable(path: &Path, reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// An opened video.
pub trait VideoSource {
    /// Returns the frame displayed at `timestamp` seconds, or `None` past the end.
    fn frame_at(&mut self, timestamp: f64) -> Result<Option<Frame>, SourceError>;

    /// Native frame count, when the container reports it. Informational only.
    fn total_frame_count(&self) -> Option<u64>;

    /// Duration in seconds, when known.
    fn duration(&self) -> Option<f64>;
}

impl<S: VideoSource + ?Sized> VideoSource for &mut S {
    fn frame_at(&mut self, timestamp: f64) -> Result<Option<Frame>, SourceError> {
        (**self).frame_at(timestamp)
    }

    fn total_frame_count(&self) -> Option<u64> {
        (**self).total_frame_count()
    }

    fn duration(&self) -> Option<f64> {
        (**self).duration()
    }
}

/// Opens videos by path.
pub trait VideoOpener {
    type Source: VideoSource;

    /// Opens the video at `path`, failing with [`SourceError::Unavailable`].
    fn open(&self, path: &Path) -> Result<Self::Source, SourceError>;
}

type Renderer = Arc<dyn Fn(f64) -> Frame + Send + Sync>;

/// In-memory video whose frames are rendered from playback time.
///
/// Records every requested timestamp so callers can inspect how the video
/// was sampled.
#[derive(Clone)]
pub struct SyntheticVideo {
    duration: f64,
    native_fps: f64,
    render: Renderer,
    fail_from: Option<f64>,
    requests: Vec<f64>,
}

impl SyntheticVideo {
    /// Creates a video of `duration` seconds rendered by `render`.
    pub fn new<F>(duration: f64, native_fps: f64, render: F) -> Self
    where
        F: Fn(f64) -> Frame + Send + Sync + 'static,
    {
        Self {
            duration,
            native_fps,
            render: Arc::new(render),
            fail_from: None,
            requests: Vec::new(),
        }
    }

    /// A video showing one colour for its whole duration.
    pub fn still(duration: f64, width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(duration, 30.0, move |_| Frame::solid(width, height, rgb))
    }

    /// A video cycling through solid-colour slides.
    ///
    /// Each entry is `(seconds_shown, colour)`; slides follow each other
    /// without transition.
    pub fn slideshow(width: u32, height: u32, slides: Vec<(f64, [u8; 3])>) -> Self {
        let duration = slides.iter().map(|(secs, _)| secs).sum();
        Self::new(duration, 30.0, move |t| {
            let mut start = 0.0;
            let mut colour = slides.last().map(|(_, c)| *c).unwrap_or([0, 0, 0]);
            for (secs, c) in &slides {
                if t < start + secs {
                    colour = *c;
                    break;
                }
                start += secs;
            }
            Frame::solid(width, height, colour)
        })
    }

    /// Makes every read at or after `timestamp` fail with a decode error.
    pub fn failing_from(mut self, timestamp: f64) -> Self {
        self.fail_from = Some(timestamp);
        self
    }

    /// Timestamps requested so far, in order.
    pub fn requests(&self) -> &[f64] {
        &self.requests
    }
}

impl VideoSource for SyntheticVideo {
    fn frame_at(&mut self, timestamp: f64) -> Result<Option<Frame>, SourceError> {
        self.requests.push(timestamp);
        if let Some(from) = self.fail_from {
            if timestamp >= from {
                return Err(SourceError::Decode {
                    timestamp,
                    reason: "synthetic decode failure".into(),
                });
            }
        }
        if timestamp < 0.0 || timestamp >= self.duration {
            return Ok(None);
        }
        Ok(Some((self.render)(timestamp)))
    }

    fn total_frame_count(&self) -> Option<u64> {
        Some((self.duration * self.native_fps).round() as u64)
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }
}

impl std::fmt::Debug for SyntheticVideo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntheticVideo")
            .field("duration", &self.duration)
            .field("native_fps", &self.native_fps)
            .field("fail_from", &self.fail_from)
            .field("requests", &self.requests.len())
            .finish()
    }
}

/// Opens [`SyntheticVideo`]s registered under a path.
///
/// Paths that were never registered are reported as unavailable.
#[derive(Debug, Default, Clone)]
pub struct SyntheticOpener {
    videos: HashMap<PathBuf, SyntheticVideo>,
}

impl SyntheticOpener {
    /// Creates an opener with no videos.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `video` under `path`.
    pub fn with_video(mut self, path: impl Into<PathBuf>, video: SyntheticVideo) -> Self {
        self.videos.insert(path.into(), video);
        self
    }
}

impl VideoOpener for SyntheticOpener {
    type Source = SyntheticVideo;

    fn open(&self, path: &Path) -> Result<SyntheticVideo, SourceError> {
        self.videos
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::unavailable(path, "no such video"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_video_bounds() {
        let mut video = SyntheticVideo::still(2.0, 8, 4, [10, 20, 30]);

        let frame = video.frame_at(0.0).unwrap().unwrap();
        assert_eq!(frame.width(), 8);
        assert_eq!(&frame.pixels()[..3], &[10, 20, 30]);

        assert!(video.frame_at(1.99).unwrap().is_some());
        assert!(video.frame_at(2.0).unwrap().is_none());
        assert_eq!(video.requests(), &[0.0, 1.99, 2.0]);
        assert_eq!(video.total_frame_count(), Some(60));
    }

    #[test]
    fn test_slideshow_switches_colour() {
        let mut video = SyntheticVideo::slideshow(2, 2, vec![(1.0, [255, 0, 0]), (1.0, [0, 0, 255])]);

        let first = video.frame_at(0.5).unwrap().unwrap();
        let second = video.frame_at(1.5).unwrap().unwrap();
        assert_eq!(&first.pixels()[..3], &[255, 0, 0]);
        assert_eq!(&second.pixels()[..3], &[0, 0, 255]);
        assert_eq!(video.duration(), Some(2.0));
    }

    #[test]
    fn test_failing_source() {
        let mut video = SyntheticVideo::still(5.0, 2, 2, [0, 0, 0]).failing_from(1.0);
        assert!(video.frame_at(0.5).is_ok());
        assert!(matches!(
            video.frame_at(1.0),
            Err(SourceError::Decode { .. })
        ));
    }

    #[test]
    fn test_opener_unknown_path() {
        let opener = SyntheticOpener::new().with_video("a.mp4", SyntheticVideo::still(1.0, 2, 2, [0; 3]));
        assert!(opener.open(Path::new("a.mp4")).is_ok());
        assert!(matches!(
            opener.open(Path::new("b.mp4")),
            Err(SourceError::Unavailable { .. })
        ));
    }
}
