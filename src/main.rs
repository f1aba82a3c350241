//! Slide Capture CLI
//!
//! Extracts one screenshot per stable scene from each input video and
//! optionally assembles them into a PDF per video.

use clap::Parser;
use slide_capture::{
    config::{AssembleMode, FileConfig},
    metrics::MetricsRegistry,
    output::{list_videos, PdfAssembler},
    session::{AutoConfirm, Confirm, PromptConfirm, Session, VideoOutcome},
    source::FfmpegOpener,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "slide-capture", version, about)]
struct Cli {
    /// Videos to process. Defaults to every file in the input directory.
    videos: Vec<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    input_dir: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Frames sampled per second of playback.
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Sampled frames ignored before the first capture.
    #[arg(long)]
    warmup: Option<u32>,

    /// Background model history in sampled frames.
    #[arg(long)]
    history: Option<u32>,

    #[arg(long)]
    var_threshold: Option<f32>,

    #[arg(long)]
    detect_shadows: bool,

    /// Foreground percentage below which a scene is captured.
    #[arg(long)]
    min_percent: Option<f64>,

    /// Foreground percentage at which motion counts as resumed.
    #[arg(long)]
    max_percent: Option<f64>,

    /// Width of the frame copy used for motion analysis.
    #[arg(long)]
    width: Option<u32>,

    /// Assemble documents without asking.
    #[arg(short, long, conflicts_with = "no_pdf")]
    yes: bool,

    /// Never assemble documents.
    #[arg(long)]
    no_pdf: bool,

    /// Write Prometheus metrics to this file after the run.
    #[arg(long)]
    metrics_out: Option<PathBuf>,
}

impl Cli {
    fn resolve(&self) -> Result<FileConfig, slide_capture::ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        let ex = &mut config.extraction;
        if let Some(v) = self.frame_rate {
            ex.frame_rate = v;
        }
        if self.warmup.is_some() {
            ex.warmup = self.warmup;
        }
        if self.history.is_some() {
            ex.history = self.history;
        }
        if let Some(v) = self.var_threshold {
            ex.var_threshold = v;
        }
        if self.detect_shadows {
            ex.detect_shadows = true;
        }
        if let Some(v) = self.min_percent {
            ex.min_percent = v;
        }
        if let Some(v) = self.max_percent {
            ex.max_percent = v;
        }
        if let Some(v) = self.width {
            ex.working_width = v;
        }
        ex.validate()?;

        let out = &mut config.output;
        if let Some(dir) = &self.input_dir {
            out.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            out.output_dir = dir.clone();
        }
        if self.yes {
            out.assemble = AssembleMode::Always;
        } else if self.no_pdf {
            out.assemble = AssembleMode::Never;
        }
        if self.metrics_out.is_some() {
            out.metrics_path = self.metrics_out.clone();
        }
        Ok(config)
    }
}

fn run_session<C: Confirm>(
    config: &FileConfig,
    confirm: C,
    metrics: Option<MetricsRegistry>,
    videos: &[PathBuf],
) -> (Vec<VideoOutcome>, Option<MetricsRegistry>) {
    let mut session = Session::new(
        FfmpegOpener::new(),
        PdfAssembler::new(),
        confirm,
        config.extraction.clone(),
        &config.output.output_dir,
    );
    if let Some(m) = metrics {
        session = session.with_metrics(m);
    }
    let outcomes = session.run(videos);
    (outcomes, session.into_metrics())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Slide Capture v{}", slide_capture::VERSION);

    let config = match cli.resolve() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let videos = if cli.videos.is_empty() {
        match list_videos(&config.output.input_dir) {
            Ok(v) => v,
            Err(e) => {
                eprintln!(
                    "Failed to list input directory {}: {}",
                    config.output.input_dir.display(),
                    e
                );
                return ExitCode::FAILURE;
            }
        }
    } else {
        cli.videos.clone()
    };
    if videos.is_empty() {
        warn!("No input videos found");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = std::fs::create_dir_all(&config.output.output_dir) {
        eprintln!(
            "Failed to create output directory {}: {}",
            config.output.output_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let metrics = match config.output.metrics_path {
        Some(_) => match MetricsRegistry::new() {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("Metrics disabled: {}", e);
                None
            }
        },
        None => None,
    };

    let (outcomes, metrics) = match config.output.assemble {
        AssembleMode::Ask => run_session(&config, PromptConfirm::stdio(), metrics, &videos),
        AssembleMode::Always => run_session(&config, AutoConfirm(true), metrics, &videos),
        AssembleMode::Never => run_session(&config, AutoConfirm(false), metrics, &videos),
    };

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => {
                println!(
                    "{}: {} screenshots captured from {} samples in {:.2}s",
                    outcome.path.display(),
                    summary.report.keyframe_count(),
                    summary.report.frames_sampled,
                    summary.report.elapsed.as_secs_f64()
                );
                if let Some(doc) = &summary.document {
                    println!("  pdf saved at {}", doc.display());
                }
            }
            Err(e) => {
                failed += 1;
                error!(path = %outcome.path.display(), "{}", e);
            }
        }
    }

    if let (Some(path), Some(metrics)) = (&config.output.metrics_path, &metrics) {
        if let Err(e) = metrics.write_to(path) {
            warn!("Failed to write metrics to {}: {}", path.display(), e);
        }
    }

    info!("Done: {} videos, {} failed", outcomes.len(), failed);
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
