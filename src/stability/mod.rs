//! Scene stability detection.
//!
//! Decides from the per-frame foreground percentage when motion has
//! settled, using a warmup window and two thresholds with a dead zone
//! between them.

mod detector;

pub use detector::{Decision, StabilityDetector, StabilityState, StabilityThresholds};
