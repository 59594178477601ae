mod extractor;
mod naming;

pub use extractor::{
    DEFAULT_TARGET_SIZE, FrameBatch, FrameExtractor, FrameGrid, FrameWarning, ProcessedFrame,
    extract_frames, load_source,
};
pub use naming::{DEFAULT_FRAME_PATTERN, FramePattern, default_sheet_path};
