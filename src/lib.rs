//! Slide Capture Library
//!
//! Turns a recorded presentation into one still image per slide. A video
//! is sampled at a fixed rate of playback time, each sample is compared
//! against an adaptive background model, and a frame is captured whenever
//! on-screen motion has settled.
//!
//! # Architecture
//!
//! ```text
//! source → sampling → motion → stability → output
//!                                   ↓
//!                      session (many videos, operator gate, PDF)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use slide_capture::{
//!     config::ExtractionConfig,
//!     output::MemorySink,
//!     pipeline::KeyframeExtractor,
//!     source::SyntheticVideo,
//! };
//!
//! let config = ExtractionConfig::default();
//! config.validate().unwrap();
//!
//! let video = SyntheticVideo::slideshow(
//!     320,
//!     180,
//!     vec![(5.0, [255, 255, 255]), (5.0, [20, 20, 80])],
//! );
//! let mut sink = MemorySink::default();
//! let report = KeyframeExtractor::new(config).run(video, &mut sink).unwrap();
//!
//! println!("{} slides from {} samples", report.keyframe_count(), report.frames_sampled);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod motion;
pub mod output;
pub mod pipeline;
pub mod sampling;
pub mod session;
pub mod source;
pub mod stability;

// Re-export commonly used types at crate root
pub use config::{AssembleMode, ConfigError, ExtractionConfig, FileConfig, OutputConfig};
pub use motion::{BackgroundSubtractor, MotionEstimator, MotionMask};
pub use output::{DirectorySink, KeyframeSink, PdfAssembler, WriteError};
pub use pipeline::{ExtractError, ExtractionReport, Keyframe, KeyframeExtractor};
pub use sampling::{FrameSampler, SampledFrame};
pub use session::{AutoConfirm, Confirm, PromptConfirm, Session, VideoOutcome};
pub use source::{FfmpegOpener, Frame, SourceError, SyntheticVideo, VideoOpener, VideoSource};
pub use stability::{Decision, StabilityDetector, StabilityState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
