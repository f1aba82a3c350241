//! Motion estimation.
//!
//! Turns each sampled frame into a [`MotionMask`] marking which pixels
//! differ from the learned background. The estimator is a trait so other
//! motion models can be substituted for the Gaussian-mixture model.

mod background;
mod mask;
mod working;

pub use background::{BackgroundParams, BackgroundSubtractor};
pub use mask::{Label, MotionMask};
pub use working::working_copy;

use image::RgbImage;
use thiserror::Error;

/// Errors raised for frames the estimator cannot process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error("frame has no pixels")]
    EmptyFrame,
    #[error("frame is {got_width}x{got_height}, model was built for {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
}

/// Classifies each pixel of a working-resolution frame.
///
/// Implementations may keep state between calls; frames must be supplied
/// in sampling order.
pub trait MotionEstimator {
    /// Updates the model with `frame` and returns its motion mask.
    fn apply(&mut self, frame: &RgbImage) -> Result<MotionMask, MotionError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
