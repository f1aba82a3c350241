//! Fixed-rate frame sampling.
//!
//! Probes a video at a virtual sample rate expressed in playback time, so
//! the amount of work per second of video does not depend on the native
//! frame rate.

mod sampler;

pub use sampler::{FrameSampler, SampledFrame};
