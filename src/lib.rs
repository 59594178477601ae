pub mod cli;
pub mod config;
pub mod error;
pub mod frames;
pub mod output;
pub mod sheet;
pub mod sprite;

pub use error::SpriteError;
pub use frames::{FrameBatch, FrameExtractor, FrameGrid, FramePattern, ProcessedFrame};
pub use sheet::{Sheet, SheetAssembler};
pub use sprite::{BackgroundRemover, BoundingBox, Color, FrameNormalizer};
