//! Extraction and output configuration.
//!
//! All tunables are read once, validated, and then passed by reference to
//! each stage. Nothing here changes while a video is being processed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables of the keyframe extraction core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Virtual sample rate in frames per second of playback time.
    pub frame_rate: f64,
    /// Sampled frames ignored before any capture. Defaults to one virtual second.
    pub warmup: Option<u32>,
    /// Frames of history for the background model. Defaults to 15 virtual seconds.
    pub history: Option<u32>,
    /// Squared Mahalanobis distance above which a pixel is foreground.
    pub var_threshold: f32,
    /// Mark shadows separately from foreground.
    pub detect_shadows: bool,
    /// Foreground percentage below which motion is considered stopped.
    pub min_percent: f64,
    /// Foreground percentage at or above which motion has resumed.
    pub max_percent: f64,
    /// Width in pixels of the copy fed to the background model.
    pub working_width: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            frame_rate: 3.0,
            warmup: None,
            history: None,
            var_threshold: 16.0,
            detect_shadows: false,
            min_percent: 0.1,
            max_percent: 3.0,
            working_width: 600,
        }
    }
}

impl ExtractionConfig {
    /// Number of sampled frames excluded from capture decisions.
    pub fn warmup_frames(&self) -> u64 {
        match self.warmup {
            Some(w) => u64::from(w),
            None => self.frame_rate.ceil() as u64,
        }
    }

    /// History length of the background model, in sampled frames.
    pub fn history_frames(&self) -> u32 {
        match self.history {
            Some(h) => h,
            None => ((self.frame_rate * 15.0).round() as u32).max(1),
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }
        for (name, value) in [
            ("min_percent", self.min_percent),
            ("max_percent", self.max_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::PercentOutOfRange { name, value });
            }
        }
        if self.min_percent >= self.max_percent {
            return Err(ConfigError::InvertedThresholds {
                min: self.min_percent,
                max: self.max_percent,
            });
        }
        if self.working_width == 0 {
            return Err(ConfigError::InvalidWorkingWidth);
        }
        if self.history == Some(0) {
            return Err(ConfigError::InvalidHistory);
        }
        if !self.var_threshold.is_finite() || self.var_threshold <= 0.0 {
            return Err(ConfigError::InvalidVarThreshold(self.var_threshold));
        }
        Ok(())
    }
}

/// When to assemble the captured keyframes into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssembleMode {
    /// Ask the operator after each video.
    #[default]
    Ask,
    /// Assemble without asking.
    Always,
    /// Never assemble.
    Never,
}

/// Where inputs are found and outputs are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory enumerated when no videos are given.
    pub input_dir: PathBuf,
    /// Root of the per-video folders and documents.
    pub output_dir: PathBuf,
    /// When to build the PDF.
    pub assemble: AssembleMode,
    /// Prometheus text dump written after the run, if set.
    pub metrics_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            assemble: AssembleMode::Ask,
            metrics_path: None,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame rate {0} (must be a positive number)")]
    InvalidFrameRate(f64),
    #[error("{name} = {value} is outside 0..=100")]
    PercentOutOfRange { name: &'static str, value: f64 },
    #[error("min_percent ({min}) must be below max_percent ({max})")]
    InvertedThresholds { min: f64, max: f64 },
    #[error("working width must be at least 1 pixel")]
    InvalidWorkingWidth,
    #[error("history must be at least 1 frame")]
    InvalidHistory,
    #[error("invalid variance threshold {0} (must be positive)")]
    InvalidVarThreshold(f32),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Extraction tunables.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Input and output locations.
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.extraction.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.warmup_frames(), 3);
        assert_eq!(config.history_frames(), 45);
    }

    #[test]
    fn test_zero_frame_rate_invalid() {
        let config = ExtractionConfig {
            frame_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrameRate(_))
        ));
    }

    #[test]
    fn test_inverted_thresholds_invalid() {
        let config = ExtractionConfig {
            min_percent: 3.0,
            max_percent: 3.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedThresholds { .. })
        ));
    }

    #[test]
    fn test_percent_out_of_range_invalid() {
        let config = ExtractionConfig {
            max_percent: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PercentOutOfRange {
                name: "max_percent",
                ..
            })
        ));
    }

    #[test]
    fn test_explicit_warmup_and_history() {
        let config = ExtractionConfig {
            frame_rate: 2.5,
            warmup: Some(10),
            ..Default::default()
        };
        assert_eq!(config.warmup_frames(), 10);
        assert_eq!(config.history_frames(), 38);
    }

    #[test]
    fn test_partial_toml() {
        let config = FileConfig::from_toml(
            r#"
            [extraction]
            frame_rate = 5.0
            max_percent = 4.5

            [output]
            assemble = "never"
            "#,
        )
        .unwrap();
        assert_eq!(config.extraction.frame_rate, 5.0);
        assert_eq!(config.extraction.max_percent, 4.5);
        assert_eq!(config.extraction.min_percent, 0.1);
        assert_eq!(config.output.assemble, AssembleMode::Never);
        assert_eq!(config.output.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        let result = FileConfig::from_toml("[extraction]\nmin_percent = 5.0\n");
        assert!(matches!(result, Err(ConfigError::InvertedThresholds { .. })));
    }
}
