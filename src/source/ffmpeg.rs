//! Video decoding through the `ffmpeg` binary.
//!
//! Every request spawns one ffmpeg process that seeks accurately to the
//! requested playback time and emits a single `rgb24` frame on stdout.

use super::{Frame, SourceError, VideoOpener, VideoSource};
use ffmpeg_sidecar::command::{ffmpeg_is_installed, FfmpegCommand};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::path::{Path, PathBuf};

/// Result of a single ffmpeg decode run.
#[derive(Debug, Default)]
struct DecodeRun {
    frame: Option<Frame>,
    duration: Option<f64>,
    native_fps: Option<f64>,
    error: Option<String>,
}

impl DecodeRun {
    /// Folds the events of one run, keeping the first frame and first error.
    fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = FfmpegEvent>,
    {
        let mut run = DecodeRun::default();
        for event in events {
            match event {
                FfmpegEvent::ParsedDuration(d) => run.duration = Some(d.duration),
                FfmpegEvent::ParsedInputStream(stream) => {
                    if let Some(video) = stream.video_data() {
                        if video.fps > 0.0 {
                            run.native_fps = Some(f64::from(video.fps));
                        }
                    }
                }
                FfmpegEvent::OutputFrame(out) if run.frame.is_none() => {
                    run.frame = Frame::from_rgb(out.width, out.height, out.data);
                }
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg)
                | FfmpegEvent::Error(msg) => {
                    if run.error.is_none() {
                        run.error = Some(msg);
                    }
                }
                _ => {}
            }
        }
        run
    }

    /// Outcome of one seek. No frame and no error means end of stream.
    fn into_frame(self, timestamp: f64) -> Result<Option<Frame>, SourceError> {
        match (self.frame, self.error) {
            (Some(frame), _) => Ok(Some(frame)),
            (None, Some(reason)) => Err(SourceError::Decode { timestamp, reason }),
            (None, None) => Ok(None),
        }
    }
}

fn decode_one(path: &Path, timestamp: Option<f64>) -> Result<DecodeRun, SourceError> {
    let mut command = FfmpegCommand::new();
    command.hide_banner();
    if let Some(t) = timestamp {
        command.seek(format!("{t:.6}"));
    }
    command
        .input(path)
        .args(["-an", "-frames:v", "1"])
        .rawvideo();

    let spawn_error = |e: &dyn std::fmt::Display| match timestamp {
        Some(t) => SourceError::Decode {
            timestamp: t,
            reason: e.to_string(),
        },
        None => SourceError::unavailable(path, e.to_string()),
    };

    let mut child = command.spawn().map_err(|e| spawn_error(&e))?;
    let events = child.iter().map_err(|e| spawn_error(&e))?;
    let run = DecodeRun::from_events(events);

    if let Err(e) = child.wait() {
        tracing::debug!(path = %path.display(), error = %e, "ffmpeg did not exit cleanly");
    }
    Ok(run)
}

/// Opens videos with ffmpeg.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegOpener;

impl FfmpegOpener {
    /// Creates the opener.
    pub fn new() -> Self {
        Self
    }
}

impl VideoOpener for FfmpegOpener {
    type Source = FfmpegVideo;

    fn open(&self, path: &Path) -> Result<FfmpegVideo, SourceError> {
        if !path.is_file() {
            return Err(SourceError::unavailable(path, "not a readable file"));
        }
        if !ffmpeg_is_installed() {
            return Err(SourceError::FfmpegMissing);
        }

        // Probe by decoding the first frame; this also yields the metadata.
        let probe = decode_one(path, None)?;
        if probe.frame.is_none() {
            if let Some(reason) = probe.error {
                return Err(SourceError::unavailable(path, reason));
            }
        }

        let video = FfmpegVideo {
            path: path.to_path_buf(),
            duration: probe.duration,
            native_fps: probe.native_fps,
        };
        tracing::info!(
            path = %path.display(),
            duration = ?video.duration,
            native_fps = ?video.native_fps,
            total_frames = ?video.total_frame_count(),
            "Opened video"
        );
        Ok(video)
    }
}

/// A video file decoded by seeking with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegVideo {
    path: PathBuf,
    duration: Option<f64>,
    native_fps: Option<f64>,
}

impl FfmpegVideo {
    /// Path of the video file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VideoSource for FfmpegVideo {
    fn frame_at(&mut self, timestamp: f64) -> Result<Option<Frame>, SourceError> {
        decode_one(&self.path, Some(timestamp))?.into_frame(timestamp)
    }

    fn total_frame_count(&self) -> Option<u64> {
        match (self.duration, self.native_fps) {
            (Some(d), Some(fps)) => Some((d * fps).round() as u64),
            _ => None,
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}
