use std::path::{Path, PathBuf};

use crate::error::SpriteError;

/// Default file name pattern for extracted frames
pub const DEFAULT_FRAME_PATTERN: &str = "frame_{n}.png";

const PLACEHOLDER: &str = "{n}";

/// File name template for frames; `{n}` is replaced by the 1-based frame number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePattern(String);

impl FramePattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, SpriteError> {
        let pattern = pattern.into();
        if !pattern.contains(PLACEHOLDER) {
            return Err(SpriteError::InvalidFramePattern(pattern));
        }
        Ok(Self(pattern))
    }

    /// File name for the frame with the given 1-based number
    pub fn file_name(&self, number: usize) -> String {
        self.0.replace(PLACEHOLDER, &number.to_string())
    }

    /// Paths of `count` frames inside `dir`, in frame order
    pub fn paths(&self, dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count).map(|n| dir.join(self.file_name(n))).collect()
    }
}

impl Default for FramePattern {
    fn default() -> Self {
        Self(DEFAULT_FRAME_PATTERN.to_string())
    }
}

/// Sheet path used when none is configured: `<output_dir>_sheet.png`,
/// next to the frames directory.
pub fn default_sheet_path(output_dir: &Path) -> PathBuf {
    match output_dir.file_name().and_then(|s| s.to_str()) {
        Some(name) if name != "." && name != ".." => {
            output_dir.with_file_name(format!("{}_sheet.png", name))
        }
        _ => output_dir.join("sheet.png"),
    }
}
