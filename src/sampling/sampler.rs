//! Seek-based sampler over a [`VideoSource`].

use crate::source::{Frame, VideoSource};

/// A frame pulled from the source at a known playback time.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// 1-based emission index.
    pub index: u64,
    /// Playback time the frame was requested at.
    pub timestamp: f64,
    /// Full-resolution pixels.
    pub frame: Frame,
}

/// Lazily pulls frames at `t_n = (n - 1) / rate`.
///
/// The sampler owns its source and is forward-only: once the source reports
/// the end of the stream the sampler stays exhausted. A read error is logged
/// and treated as the end of the stream.
pub struct FrameSampler<S> {
    source: S,
    rate: f64,
    emitted: u64,
    finished: bool,
}

impl<S: VideoSource> FrameSampler<S> {
    /// Creates a sampler probing `source` at `rate` frames per second.
    ///
    /// `rate` must be positive; configuration validation guarantees this.
    pub fn new(source: S, rate: f64) -> Self {
        debug_assert!(rate > 0.0);
        Self {
            source,
            rate,
            emitted: 0,
            finished: false,
        }
    }

    /// Playback time of the `n`-th sample (1-based).
    #[inline]
    pub fn timestamp_of(rate: f64, n: u64) -> f64 {
        (n - 1) as f64 / rate
    }

    /// Number of frames emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Returns the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Releases the source.
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: VideoSource> Iterator for FrameSampler<S> {
    type Item = SampledFrame;

    fn next(&mut self) -> Option<SampledFrame> {
        if self.finished {
            return None;
        }

        let index = self.emitted + 1;
        let timestamp = Self::timestamp_of(self.rate, index);

        match self.source.frame_at(timestamp) {
            Ok(Some(frame)) => {
                self.emitted = index;
                Some(SampledFrame {
                    index,
                    timestamp,
                    frame,
                })
            }
            Ok(None) => {
                tracing::debug!(frames = self.emitted, timestamp, "End of stream");
                self.finished = true;
                None
            }
            Err(e) => {
                tracing::warn!(
                    frames = self.emitted,
                    timestamp,
                    error = %e,
                    "Frame read failed, treating as end of stream"
                );
                self.finished = true;
                None
            }
        }
    }
}

impl<S: VideoSource> std::iter::FusedIterator for FrameSampler<S> {}
