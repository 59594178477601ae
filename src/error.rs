use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compress PNG '{path}': {message}")]
    PngCompress { path: PathBuf, message: String },

    #[error("Source image not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Frame missing: {0}")]
    MissingFrame(PathBuf),

    #[error("Source image {width}x{height} is too small for a {cols}x{rows} frame grid")]
    SourceTooSmall {
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
    },

    #[error("Frame grid must have at least one row and one column, got {rows}x{cols}")]
    InvalidGrid { rows: u32, cols: u32 },

    #[error("Target size must be greater than 4 pixels, got {0}")]
    InvalidTargetSize(u32),

    #[error("Frame name pattern '{0}' must contain the '{{n}}' placeholder")]
    InvalidFramePattern(String),

    #[error("Flood fill seed ({x}, {y}) is outside the {width}x{height} image")]
    SeedOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Expected {expected} frames for the sheet, got {actual}")]
    FrameCountMismatch { expected: usize, actual: usize },

    #[error("Frame {index} is {width}x{height}, expected {expected}x{expected}")]
    FrameSizeMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected: u32,
    },
}
