//! Keyframe extraction for one video.
//!
//! ```text
//! VideoSource → FrameSampler → working copy → MotionEstimator → StabilityDetector
//!                                                                    ↓ Capture
//!                                                              KeyframeSink
//! ```
//!
//! Frames are processed strictly in sampling order on the calling thread.

use crate::config::ExtractionConfig;
use crate::motion::{working_copy, BackgroundSubtractor, MotionError, MotionEstimator};
use crate::output::{KeyframeSink, WriteError};
use crate::sampling::{FrameSampler, SampledFrame};
use crate::source::{Frame, SourceError, VideoSource};
use crate::stability::{Decision, StabilityDetector};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that end the extraction of one video.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("motion analysis failed: {0}")]
    Motion(#[from] MotionError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// A full-resolution frame chosen to represent one stable scene.
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// 0-based capture order within the video.
    pub sequence_number: u32,
    /// Index of the sampled frame that triggered the capture.
    pub frame_index: u64,
    /// Playback time in seconds.
    pub timestamp: f64,
    /// Full-resolution pixels.
    pub frame: Frame,
}

impl Keyframe {
    /// Playback time in minutes, as used in file names.
    pub fn playback_minutes(&self) -> f64 {
        self.timestamp / 60.0
    }
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of frames pulled from the source.
    pub frames_sampled: u64,
    /// Written keyframes, in capture order.
    pub keyframes: Vec<PathBuf>,
    /// Foreground percentage of the last sampled frame.
    pub last_percent: Option<f64>,
    /// Native frame count reported by the source.
    pub total_frames: Option<u64>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl ExtractionReport {
    /// Number of keyframes written.
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }
}

/// Runs sampler, motion model and stability detector over one video.
///
/// Holds per-video state; build a new extractor for every video.
pub struct KeyframeExtractor<M = BackgroundSubtractor> {
    config: ExtractionConfig,
    estimator: M,
    detector: StabilityDetector,
    last_percent: Option<f64>,
}

impl KeyframeExtractor<BackgroundSubtractor> {
    /// Creates an extractor with the Gaussian-mixture background model.
    pub fn new(config: ExtractionConfig) -> Self {
        let estimator = BackgroundSubtractor::from_config(&config);
        Self::with_estimator(config, estimator)
    }
}

impl<M: MotionEstimator> KeyframeExtractor<M> {
    /// Creates an extractor using a custom motion estimator.
    pub fn with_estimator(config: ExtractionConfig, estimator: M) -> Self {
        let detector = StabilityDetector::from_config(&config);
        Self {
            config,
            estimator,
            detector,
            last_percent: None,
        }
    }

    /// Current state of the stability detector.
    pub fn detector(&self) -> &StabilityDetector {
        &self.detector
    }

    /// Processes one sampled frame and returns a keyframe if it was captured.
    ///
    /// The sampled frame is consumed; only a captured frame is kept.
    pub fn step(&mut self, sampled: SampledFrame) -> Result<Option<Keyframe>, MotionError> {
        let work = working_copy(sampled.frame.image(), self.config.working_width);
        let mask = self.estimator.apply(&work)?;
        let percent = mask.foreground_percent();
        self.last_percent = Some(percent);

        tracing::trace!(frame = sampled.index, timestamp = sampled.timestamp, percent, "Motion");

        match self.detector.observe(sampled.index, percent) {
            Decision::Capture { sequence_number } => Ok(Some(Keyframe {
                sequence_number,
                frame_index: sampled.index,
                timestamp: sampled.timestamp,
                frame: sampled.frame,
            })),
            Decision::Rearm | Decision::Hold => Ok(None),
        }
    }

    /// Extracts all keyframes of `source` into `sink`.
    pub fn run<S, K>(mut self, source: S, sink: &mut K) -> Result<ExtractionReport, ExtractError>
    where
        S: VideoSource,
        K: KeyframeSink + ?Sized,
    {
        let start = Instant::now();
        let total_frames = source.total_frame_count();
        let progress_every = ((self.config.frame_rate * 60.0).round() as u64).max(1);

        tracing::info!(
            total_frames = ?total_frames,
            frame_rate = self.config.frame_rate,
            estimator = self.estimator.name(),
            "Extracting keyframes"
        );

        let mut report = ExtractionReport {
            total_frames,
            ..Default::default()
        };

        for sampled in FrameSampler::new(source, self.config.frame_rate) {
            let index = sampled.index;
            report.frames_sampled = index;

            if let Some(keyframe) = self.step(sampled)? {
                let path = sink.write(&keyframe)?;
                tracing::info!(
                    sequence = keyframe.sequence_number,
                    frame = keyframe.frame_index,
                    timestamp = keyframe.timestamp,
                    path = %path.display(),
                    "Saved keyframe"
                );
                report.keyframes.push(path);
            }

            if index % progress_every == 0 {
                tracing::info!(
                    frames = index,
                    keyframes = report.keyframes.len(),
                    "Progress"
                );
            }
        }

        report.last_percent = self.last_percent;
        report.elapsed = start.elapsed();
        tracing::info!(
            frames = report.frames_sampled,
            keyframes = report.keyframes.len(),
            elapsed_secs = report.elapsed.as_secs_f64(),
            "Extraction finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{Label, MotionMask};
    use crate::output::MemorySink;
    use crate::source::SyntheticVideo;
    use image::RgbImage;

    /// Replays a fixed sequence of foreground percentages.
    struct Scripted {
        percents: Vec<f64>,
        next: usize,
    }

    impl MotionEstimator for Scripted {
        fn apply(&mut self, frame: &RgbImage) -> Result<MotionMask, MotionError> {
            let p = self.percents[self.next];
            self.next += 1;
            // 10_000 pixels so every 0.01% is one pixel.
            let mut mask = MotionMask::filled(100, 100, Label::Background);
            let on = (p * 100.0).round() as u32;
            for i in 0..on {
                mask.set(i % 100, i / 100, Label::Foreground);
            }
            assert_eq!(frame.width(), 16);
            Ok(mask)
        }
    }

    fn small_config() -> ExtractionConfig {
        ExtractionConfig {
            working_width: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_scripted_percentages() {
        let estimator = Scripted {
            percents: vec![50.0, 50.0, 50.0, 0.05, 0.05, 5.0, 0.02],
            next: 0,
        };
        let extractor = KeyframeExtractor::with_estimator(small_config(), estimator);
        let video = SyntheticVideo::still(7.0 / 3.0, 32, 18, [0, 0, 0]);
        let mut sink = MemorySink::default();

        let report = extractor.run(video, &mut sink).unwrap();

        assert_eq!(report.frames_sampled, 7);
        let captured: Vec<_> = sink
            .keyframes()
            .iter()
            .map(|k| (k.sequence_number, k.frame_index))
            .collect();
        assert_eq!(captured, vec![(0, 4), (1, 7)]);
        assert_eq!(sink.keyframes()[1].timestamp, 2.0);
    }

    #[test]
    fn test_keyframe_keeps_full_resolution() {
        let mut extractor = KeyframeExtractor::new(small_config());
        let mut video = SyntheticVideo::still(3.0, 64, 36, [90, 90, 90]);
        let mut captured = None;
        for sampled in FrameSampler::new(&mut video, 3.0) {
            if let Some(k) = extractor.step(sampled).unwrap() {
                captured = Some(k);
                break;
            }
        }
        let keyframe = captured.unwrap();
        assert_eq!(keyframe.frame.width(), 64);
        assert_eq!(keyframe.frame.height(), 36);
        assert_eq!(keyframe.frame_index, 4);
        assert_eq!(keyframe.timestamp, 1.0);
    }
}
