//! Prometheus metrics for extraction runs.
//!
//! # Metrics Exposed
//!
//! - `slide_capture_frames_sampled_total` - Sampled frames across all videos
//! - `slide_capture_keyframes_total` - Keyframes written across all videos
//! - `slide_capture_videos_processed_total` - Videos extracted successfully
//! - `slide_capture_videos_failed_total` - Videos that failed
//! - `slide_capture_last_foreground_percent` - Foreground ratio of the last sampled frame
//! - `slide_capture_last_extraction_seconds` - Wall time of the last extraction
//!
//! There is no HTTP endpoint; the binary writes the text exposition to a
//! file after the run.

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
