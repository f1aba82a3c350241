//! Persistence of keyframes and assembled documents.
//!
//! Everything here is file-system glue around the extraction core:
//! enumerating inputs, preparing one output folder per video, writing
//! keyframes as PNG and concatenating them into a PDF.

mod pdf;
mod sink;
mod workspace;

pub use pdf::{DocumentAssembler, PdfAssembler};
pub use sink::{keyframe_file_name, DirectorySink, KeyframeSink, MemorySink};
pub use workspace::{
    collect_keyframe_images, document_path, list_videos, prepare_output_dir, video_stem,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing keyframes or documents.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("image error on {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to build document: {0}")]
    Pdf(String),
    #[error("no keyframe images to assemble")]
    NoImages,
}

impl WriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WriteError::Io {
            path: path.into(),
            source,
        }
    }
}
