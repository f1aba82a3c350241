//! Adaptive Gaussian-mixture background model.
//!
//! Each pixel is modelled by up to [`DEFAULT_COMPONENTS`] Gaussian
//! components over RGB with an isotropic variance. Components are kept
//! sorted by weight; the heaviest ones whose weights sum to
//! `background_ratio` describe the background. A pixel is background if it
//! lies within `var_threshold` squared Mahalanobis distance of one of them.
//!
//! The model learns on every call with rate `1 / min(2 * frames, history)`,
//! so the first frames bootstrap it quickly and later frames are averaged
//! over roughly `history` observations. Components that are rarely matched
//! decay below a pruning bound and are dropped, which lets the number of
//! components per pixel adapt to the scene.

use super::{Label, MotionError, MotionEstimator, MotionMask};
use crate::config::ExtractionConfig;
use image::RgbImage;

/// Maximum number of mixture components per pixel.
pub const DEFAULT_COMPONENTS: usize = 5;

/// Parameters of the mixture model.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundParams {
    /// Frames of history that determine the steady-state learning rate.
    pub history: u32,
    /// Squared distance below which a pixel matches a background component.
    pub var_threshold: f32,
    /// Label shadows instead of foreground when set.
    pub detect_shadows: bool,
    /// Upper bound on components per pixel.
    pub max_components: usize,
    /// Cumulative weight of the components treated as background.
    pub background_ratio: f32,
    /// Squared distance below which a pixel updates an existing component.
    pub var_threshold_gen: f32,
    /// Variance of a newly created component.
    pub var_init: f32,
    /// Lower bound on component variance.
    pub var_min: f32,
    /// Upper bound on component variance.
    pub var_max: f32,
    /// Complexity reduction prior; scales the pruning bound.
    pub complexity_reduction: f32,
    /// Minimum brightness ratio for a darker pixel to count as shadow.
    pub shadow_threshold: f32,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self {
            history: 45,
            var_threshold: 16.0,
            detect_shadows: false,
            max_components: DEFAULT_COMPONENTS,
            background_ratio: 0.9,
            var_threshold_gen: 9.0,
            var_init: 15.0,
            var_min: 4.0,
            var_max: 75.0,
            complexity_reduction: 0.05,
            shadow_threshold: 0.5,
        }
    }
}

impl BackgroundParams {
    /// Takes history, threshold and shadow flag from the extraction config.
    /// Creates a model with the history and thresholds of `config`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            history: config.history_frames(),
            var_threshold: config.var_threshold,
            detect_shadows: config.detect_shadows,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Component {
    weight: f32,
    variance: f32,
    mean: [f32; 3],
}

/// Per-pixel Gaussian-mixture background subtractor.
pub struct BackgroundSubtractor {
    params: BackgroundParams,
    width: u32,
    height: u32,
    frames_seen: u64,
    /// `max_components` slots per pixel, heaviest first.
    components: Vec<Component>,
    /// Number of live components per pixel.
    modes_used: Vec<u8>,
}

impl BackgroundSubtractor {
    /// Creates an empty model; the first frame fixes its size.
    pub fn new(params: BackgroundParams) -> Self {
        let params = BackgroundParams {
            max_components: params.max_components.clamp(1, u8::MAX as usize),
            history: params.history.max(1),
            ..params
        };
        Self {
            params,
            width: 0,
            height: 0,
            frames_seen: 0,
            components: Vec::new(),
            modes_used: Vec::new(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(BackgroundParams::from_config(config))
    }

    /// Parameters the model was built with.
    pub fn params(&self) -> &BackgroundParams {
        &self.params
    }

    /// Frames the model has learned from.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Learning rate applied to the next frame.
    pub fn next_learning_rate(&self) -> f32 {
        learning_rate(self.frames_seen + 1, self.params.history)
    }

    fn initialize(&mut self, width: u32, height: u32) {
        let pixels = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.components = vec![Component::default(); pixels * self.params.max_components];
        self.modes_used = vec![0; pixels];
        tracing::debug!(
            width,
            height,
            history = self.params.history,
            var_threshold = self.params.var_threshold,
            "Background model initialised"
        );
    }
}

impl Default for BackgroundSubtractor {
    fn default() -> Self {
        Self::new(BackgroundParams::default())
    }
}

impl MotionEstimator for BackgroundSubtractor {
    fn apply(&mut self, frame: &RgbImage) -> Result<MotionMask, MotionError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(MotionError::EmptyFrame);
        }
        if self.frames_seen == 0 {
            self.initialize(width, height);
        } else if (width, height) != (self.width, self.height) {
            return Err(MotionError::DimensionMismatch {
                width: self.width,
                height: self.height,
                got_width: width,
                got_height: height,
            });
        }

        self.frames_seen += 1;
        let alpha = learning_rate(self.frames_seen, self.params.history);
        let k = self.params.max_components;

        let mut labels = Vec::with_capacity(self.modes_used.len());
        for (i, px) in frame.pixels().enumerate() {
            let sample = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];
            let slots = &mut self.components[i * k..(i + 1) * k];
            let (used, label) =
                update_pixel(slots, self.modes_used[i] as usize, sample, &self.params, alpha);
            self.modes_used[i] = used as u8;
            labels.push(label.value());
        }

        Ok(MotionMask::from_labels(width, height, labels))
    }

    fn name(&self) -> &str {
        "gaussian-mixture"
    }
}

#[inline]
fn learning_rate(frame_number: u64, history: u32) -> f32 {
    1.0 / (2 * frame_number).min(u64::from(history)) as f32
}

#[inline]
fn distance2(mean: &[f32; 3], sample: &[f32; 3]) -> (f32, [f32; 3]) {
    let diff = [
        mean[0] - sample[0],
        mean[1] - sample[1],
        mean[2] - sample[2],
    ];
    (diff[0] * diff[0] + diff[1] * diff[1] + diff[2] * diff[2], diff)
}

/// Updates one pixel's mixture with `sample` and classifies it.
///
/// Returns the new number of live components and the label.
fn update_pixel(
    slots: &mut [Component],
    used: usize,
    sample: [f32; 3],
    params: &BackgroundParams,
    alpha: f32,
) -> (usize, Label) {
    let alpha1 = 1.0 - alpha;
    let prune = -alpha * params.complexity_reduction;
    let max = slots.len();

    let mut background = false;
    let mut fits = false;
    let mut total_weight = 0.0f32;
    let mut modes = used;

    let mut mode = 0;
    while mode < modes {
        let mut weight = alpha1 * slots[mode].weight + prune;
        let mut swaps = 0;

        if !fits {
            let var = slots[mode].variance;
            let (dist2, diff) = distance2(&slots[mode].mean, &sample);

            if total_weight < params.background_ratio && dist2 < params.var_threshold * var {
                background = true;
            }

            if dist2 < params.var_threshold_gen * var {
                fits = true;
                weight += alpha;
                let k = alpha / weight;

                let slot = &mut slots[mode];
                for (m, d) in slot.mean.iter_mut().zip(diff) {
                    *m -= k * d;
                }
                slot.variance = (var + k * (dist2 - var)).clamp(params.var_min, params.var_max);

                // Only the matched component grew; bubble it up.
                let mut i = mode;
                while i > 0 && weight >= slots[i - 1].weight {
                    slots.swap(i, i - 1);
                    swaps += 1;
                    i -= 1;
                }
            }
        }

        if weight < -prune {
            weight = 0.0;
            modes -= 1;
        }

        slots[mode - swaps].weight = weight;
        total_weight += weight;
        mode += 1;
    }

    let inv = if total_weight.abs() > f32::EPSILON {
        1.0 / total_weight
    } else {
        0.0
    };
    for slot in &mut slots[..modes] {
        slot.weight *= inv;
    }

    if !fits && alpha > 0.0 {
        // Replace the weakest component or add a new one.
        let mode = if modes == max {
            max - 1
        } else {
            modes += 1;
            modes - 1
        };

        if modes == 1 {
            slots[mode].weight = 1.0;
        } else {
            slots[mode].weight = alpha;
            for slot in &mut slots[..modes - 1] {
                slot.weight *= alpha1;
            }
        }
        slots[mode].mean = sample;
        slots[mode].variance = params.var_init;

        let mut i = modes - 1;
        while i > 0 && alpha >= slots[i - 1].weight {
            slots.swap(i, i - 1);
            i -= 1;
        }
    }

    let label = if background {
        Label::Background
    } else if params.detect_shadows && is_shadow(&slots[..modes], sample, params) {
        Label::Shadow
    } else {
        Label::Foreground
    };
    (modes, label)
}

/// A darker copy of a background colour within the variance bound.
fn is_shadow(slots: &[Component], sample: [f32; 3], params: &BackgroundParams) -> bool {
    let mut total_weight = 0.0f32;
    for slot in slots {
        let mean = &slot.mean;
        let numerator: f32 = mean.iter().zip(sample).map(|(m, s)| m * s).sum();
        let denominator: f32 = mean.iter().map(|m| m * m).sum();
        if denominator == 0.0 {
            return false;
        }

        if numerator <= denominator && numerator >= params.shadow_threshold * denominator {
            let a = numerator / denominator;
            let dist2a: f32 = mean
                .iter()
                .zip(sample)
                .map(|(m, s)| {
                    let d = a * m - s;
                    d * d
                })
                .sum();
            if dist2a < params.var_threshold * slot.variance * a * a {
                return true;
            }
        }

        total_weight += slot.weight;
        if total_weight > params.background_ratio {
            return false;
        }
    }
    false
}
