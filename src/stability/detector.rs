//! Two-threshold stability state machine.

use crate::config::ExtractionConfig;

/// Thresholds driving the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityThresholds {
    /// Frames with index `<= warmup` never trigger a capture.
    pub warmup: u64,
    /// Below this foreground percentage the scene is stable.
    pub min_percent: f64,
    /// At or above this foreground percentage motion has resumed.
    pub max_percent: f64,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            warmup: 3,
            min_percent: 0.1,
            max_percent: 3.0,
        }
    }
}

impl StabilityThresholds {
    /// Thresholds taken from `config`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            warmup: config.warmup_frames(),
            min_percent: config.min_percent,
            max_percent: config.max_percent,
        }
    }
}

/// Whether the current scene has already been captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StabilityState {
    /// Waiting for motion to settle.
    #[default]
    Unstable,
    /// Captured; waiting for motion to resume.
    Stable,
}

/// Outcome of observing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Capture this frame as keyframe `sequence_number`.
    Capture {
        /// 0-based capture count within the video.
        sequence_number: u32,
    },
    /// Motion resumed; the next settled scene may be captured.
    Rearm,
    /// No change.
    Hold,
}

/// Hysteresis detector over foreground percentages.
///
/// Exactly one [`Decision::Capture`] is produced per transition from
/// [`StabilityState::Unstable`] to [`StabilityState::Stable`]. Percentages in
/// `[min_percent, max_percent)` never change the state.
#[derive(Debug, Clone)]
pub struct StabilityDetector {
    thresholds: StabilityThresholds,
    state: StabilityState,
    captures: u32,
}

impl StabilityDetector {
    /// Creates a detector in the unstable state.
    pub fn new(thresholds: StabilityThresholds) -> Self {
        Self {
            thresholds,
            state: StabilityState::Unstable,
            captures: 0,
        }
    }

    /// Creates a detector with the thresholds of `config`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(StabilityThresholds::from_config(config))
    }

    /// Feeds the foreground percentage of the sampled frame `index` (1-based).
    pub fn observe(&mut self, index: u64, percent: f64) -> Decision {
        match self.state {
            StabilityState::Unstable
                if percent < self.thresholds.min_percent && index > self.thresholds.warmup =>
            {
                let sequence_number = self.captures;
                self.state = StabilityState::Stable;
                self.captures += 1;
                tracing::debug!(frame = index, percent, sequence_number, "Scene settled");
                Decision::Capture { sequence_number }
            }
            StabilityState::Stable if percent >= self.thresholds.max_percent => {
                self.state = StabilityState::Unstable;
                tracing::debug!(frame = index, percent, "Motion resumed");
                Decision::Rearm
            }
            _ => Decision::Hold,
        }
    }

    /// Current state.
    pub fn state(&self) -> StabilityState {
        self.state
    }

    /// Number of captures decided so far.
    pub fn captures(&self) -> u32 {
        self.captures
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &StabilityThresholds {
        &self.thresholds
    }
}

impl Default for StabilityDetector {
    fn default() -> Self {
        Self::new(StabilityThresholds::default())
    }
}
