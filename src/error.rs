//! Error types for the edge pipeline and its frame collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the edge detection core.
///
/// Configuration errors are raised once, before any frame is processed. Shape and allocation
/// errors are raised per frame; no partially written output is ever returned alongside them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CannyError {
    #[error("sigma must be a positive finite number, got {0}")]
    InvalidSigma(f32),
    #[error("{name} must lie in (0.0, 1.0], got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    #[error("thigh ({thigh}) must not be smaller than tlow ({tlow})")]
    InvertedThresholds { tlow: f32, thigh: f32 },
    #[error("frame has no pixel data ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("frame is {actual_width}x{actual_height}, pipeline expects {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("buffer holds {actual} bytes, {width}x{height} frame needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("could not allocate {bytes} bytes of working memory")]
    Allocation { bytes: usize },
}

/// Errors raised while acquiring or persisting frames around the core.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error in {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("stream ended mid-frame: read {read} of {expected} bytes")]
    TruncatedFrame { read: usize, expected: usize },
    #[error("{path} is {actual_width}x{actual_height}, stream is {width}x{height}")]
    FrameSizeMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("no frames found in {0}")]
    NoFrames(PathBuf),
    #[error(transparent)]
    Canny(#[from] CannyError),
}
