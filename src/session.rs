//! Processing of a list of videos.
//!
//! Each video is opened, extracted into its own output folder and, after
//! the operator confirms, assembled into a document. A failure of one video
//! is recorded in its [`VideoOutcome`] and the next video is processed.

use crate::config::ExtractionConfig;
use crate::metrics::MetricsRegistry;
use crate::output::{
    collect_keyframe_images, document_path, prepare_output_dir, DirectorySink, DocumentAssembler,
    WriteError,
};
use crate::pipeline::{ExtractError, ExtractionReport, KeyframeExtractor};
use crate::source::VideoOpener;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Operator decision taken after a video was extracted.
pub trait Confirm {
    /// Returns true if the keyframes of `video` should be assembled.
    fn confirm(&mut self, video: &Path, keyframes: usize) -> bool;
}

/// Answers every confirmation with the same value.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _video: &Path, _keyframes: usize) -> bool {
        self.0
    }
}

/// Asks on a terminal until the answer is `y` or `n`.
///
/// End of input counts as `n`.
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    /// Prompts on `output` and reads answers from `input`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirm<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompts on the terminal.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    fn ask(&mut self, video: &Path, keyframes: usize) -> std::io::Result<bool> {
        writeln!(
            self.output,
            "{keyframes} screenshots saved for {}.",
            video.display()
        )?;
        writeln!(self.output, "Please manually verify screenshots and delete duplicates")?;
        loop {
            write!(self.output, "Press y to continue and n to skip: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            match line.trim().to_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => writeln!(self.output, "please enter a valid choice")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, video: &Path, keyframes: usize) -> bool {
        match self.ask(video, keyframes) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed, skipping document");
                false
            }
        }
    }
}

/// Result of one successfully processed video.
#[derive(Debug, Clone)]
pub struct VideoSummary {
    /// Extraction counters.
    pub report: ExtractionReport,
    /// Folder holding the keyframes.
    pub output_dir: PathBuf,
    /// Assembled document, if the operator confirmed and keyframes exist.
    pub document: Option<PathBuf>,
}

/// Per-video result of a session.
#[derive(Debug)]
pub struct VideoOutcome {
    /// Input video.
    pub path: PathBuf,
    /// Summary, or the error that stopped this video.
    pub result: Result<VideoSummary, ExtractError>,
}

impl VideoOutcome {
    /// True if the video was processed.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs extraction over many videos, one at a time.
pub struct Session<O, A, C> {
    opener: O,
    assembler: A,
    confirm: C,
    config: ExtractionConfig,
    output_dir: PathBuf,
    metrics: Option<MetricsRegistry>,
}

impl<O, A, C> Session<O, A, C>
where
    O: VideoOpener,
    A: DocumentAssembler,
    C: Confirm,
{
    /// `config` must already be validated.
    pub fn new(
        opener: O,
        assembler: A,
        confirm: C,
        config: ExtractionConfig,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            opener,
            assembler,
            confirm,
            config,
            output_dir: output_dir.into(),
            metrics: None,
        }
    }

    /// Records per-video counters into `metrics`.
    pub fn with_metrics(mut self, metrics: MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Metrics registry, if one was attached.
    pub fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_ref()
    }

    /// Consumes the session and returns its metrics registry.
    pub fn into_metrics(self) -> Option<MetricsRegistry> {
        self.metrics
    }

    /// Processes `videos` in order; one outcome per input.
    pub fn run(&mut self, videos: &[PathBuf]) -> Vec<VideoOutcome> {
        videos
            .iter()
            .map(|video| {
                tracing::info!(path = %video.display(), "Processing video");
                let result = self.process(video);
                match &result {
                    Ok(summary) => {
                        if let Some(metrics) = &self.metrics {
                            metrics.record_video(&summary.report);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %video.display(), error = %e, "Video failed");
                        if let Some(metrics) = &self.metrics {
                            metrics.record_failure();
                        }
                    }
                }
                VideoOutcome {
                    path: video.clone(),
                    result,
                }
            })
            .collect()
    }

    fn process(&mut self, video: &Path) -> Result<VideoSummary, ExtractError> {
        let source = self.opener.open(video)?;
        let output_dir = prepare_output_dir(&self.output_dir, video)?;
        let mut sink = DirectorySink::new(&output_dir);

        let report = KeyframeExtractor::new(self.config.clone()).run(source, &mut sink)?;
        tracing::info!(
            path = %video.display(),
            keyframes = report.keyframe_count(),
            elapsed_secs = report.elapsed.as_secs_f64(),
            "Screenshots captured"
        );

        let document = if self.confirm.confirm(video, report.keyframe_count()) {
            self.assemble(video, &output_dir)?
        } else {
            tracing::info!(path = %video.display(), "Document skipped by operator");
            None
        };

        Ok(VideoSummary {
            report,
            output_dir,
            document,
        })
    }

    fn assemble(&self, video: &Path, dir: &Path) -> Result<Option<PathBuf>, WriteError> {
        let images = collect_keyframe_images(dir)?;
        if images.is_empty() {
            tracing::warn!(path = %dir.display(), "No screenshots left to assemble");
            return Ok(None);
        }

        let bytes = self.assembler.assemble(&images)?;
        let path = document_path(&self.output_dir, video);
        std::fs::write(&path, bytes).map_err(|e| WriteError::io(&path, e))?;
        tracing::info!(path = %path.display(), pages = images.len(), "Document saved");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_repeats_until_valid() {
        let mut out = Vec::new();
        let mut prompt = PromptConfirm::new(Cursor::new("maybe\n\n  Y \n"), &mut out);

        assert!(prompt.confirm(Path::new("talk.mp4"), 3));
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("please enter a valid choice").count(), 2);
        assert!(text.contains("3 screenshots saved for talk.mp4."));
    }

    #[test]
    fn test_prompt_no() {
        let mut prompt = PromptConfirm::new(Cursor::new("n\n"), Vec::new());
        assert!(!prompt.confirm(Path::new("talk.mp4"), 0));
    }

    #[test]
    fn test_prompt_eof_is_no() {
        let mut prompt = PromptConfirm::new(Cursor::new(""), Vec::new());
        assert!(!prompt.confirm(Path::new("talk.mp4"), 1));
    }

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm(Path::new("a"), 1));
        assert!(!AutoConfirm(false).confirm(Path::new("a"), 1));
    }
}
