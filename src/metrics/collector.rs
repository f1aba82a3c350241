//! Metrics collection and registry.

use crate::pipeline::ExtractionReport;
use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("failed to write metrics: {0}")]
    Io(#[from] std::io::Error),
}

/// Prometheus metrics registry for extraction runs.
pub struct MetricsRegistry {
    registry: Registry,

    frames_sampled: IntCounter,
    keyframes: IntCounter,
    videos_processed: IntCounter,
    videos_failed: IntCounter,

    last_foreground_percent: Gauge,
    last_extraction_seconds: Gauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all extraction metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_sampled = IntCounter::new(
            "slide_capture_frames_sampled_total",
            "Total number of frames sampled",
        )?;
        let keyframes = IntCounter::new(
            "slide_capture_keyframes_total",
            "Total number of keyframes written",
        )?;
        let videos_processed = IntCounter::new(
            "slide_capture_videos_processed_total",
            "Videos extracted successfully",
        )?;
        let videos_failed = IntCounter::new(
            "slide_capture_videos_failed_total",
            "Videos that could not be processed",
        )?;
        let last_foreground_percent = Gauge::new(
            "slide_capture_last_foreground_percent",
            "Foreground percentage of the last sampled frame",
        )?;
        let last_extraction_seconds = Gauge::new(
            "slide_capture_last_extraction_seconds",
            "Wall time of the last extraction in seconds",
        )?;

        registry.register(Box::new(frames_sampled.clone()))?;
        registry.register(Box::new(keyframes.clone()))?;
        registry.register(Box::new(videos_processed.clone()))?;
        registry.register(Box::new(videos_failed.clone()))?;
        registry.register(Box::new(last_foreground_percent.clone()))?;
        registry.register(Box::new(last_extraction_seconds.clone()))?;

        Ok(Self {
            registry,
            frames_sampled,
            keyframes,
            videos_processed,
            videos_failed,
            last_foreground_percent,
            last_extraction_seconds,
        })
    }

    /// Adds the counters of one finished extraction.
    pub fn record_video(&self, report: &ExtractionReport) {
        self.videos_processed.inc();
        self.frames_sampled.inc_by(report.frames_sampled);
        self.keyframes.inc_by(report.keyframes.len() as u64);
        if let Some(percent) = report.last_percent {
            self.last_foreground_percent.set(percent);
        }
        self.last_extraction_seconds
            .set(report.elapsed.as_secs_f64());
    }

    /// Counts a video that failed to open or extract.
    pub fn record_failure(&self) {
        self.videos_failed.inc();
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the text exposition to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), MetricsError> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_record_video() {
        let registry = MetricsRegistry::new().unwrap();

        let report = ExtractionReport {
            frames_sampled: 30,
            keyframes: vec![PathBuf::from("000_0.02.png"), PathBuf::from("001_0.10.png")],
            last_percent: Some(0.5),
            total_frames: Some(300),
            elapsed: Duration::from_millis(1500),
        };
        registry.record_video(&report);
        registry.record_video(&report);
        registry.record_failure();

        let output = registry.encode().unwrap();
        assert!(output.contains("slide_capture_frames_sampled_total 60"));
        assert!(output.contains("slide_capture_keyframes_total 4"));
        assert!(output.contains("slide_capture_videos_processed_total 2"));
        assert!(output.contains("slide_capture_videos_failed_total 1"));
        assert!(output.contains("slide_capture_last_extraction_seconds 1.5"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.prom");
        let registry = MetricsRegistry::new().unwrap();

        registry.write_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("slide_capture_keyframes_total"));
    }
}
