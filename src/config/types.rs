use serde::{Deserialize, Serialize};

use crate::frames::{DEFAULT_FRAME_PATTERN, DEFAULT_TARGET_SIZE};
use crate::sprite::{DEFAULT_CORNER_THRESHOLD, DEFAULT_CROP_PADDING, DEFAULT_FILL_THRESHOLD};

/// PNG compression level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

/// Spritecut configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Source image containing all frames
    pub source: Option<String>,
    /// Directory the individual frames are written to
    pub output_dir: String,
    /// Frame file name pattern, `{n}` is the 1-based frame number
    pub frame_pattern: String,
    /// Sprite sheet path (defaults to `<output_dir>_sheet.png`)
    pub sheet: Option<String>,
    /// Edge length of the square output frames
    pub target_size: u32,
    /// Frame grid rows in the source image
    pub rows: u32,
    /// Frame grid columns in the source image
    pub cols: u32,
    /// Transparent border kept around detected content before scaling
    pub crop_padding: u32,
    /// Max distance between a corner and the background color to start a fill
    pub corner_threshold: f64,
    /// Max distance to the seed color for a pixel to be filled
    pub fill_threshold: f64,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            version: 1,
            source: None,
            output_dir: "frames".to_string(),
            frame_pattern: DEFAULT_FRAME_PATTERN.to_string(),
            sheet: None,
            target_size: DEFAULT_TARGET_SIZE,
            rows: 2,
            cols: 2,
            crop_padding: DEFAULT_CROP_PADDING,
            corner_threshold: DEFAULT_CORNER_THRESHOLD,
            fill_threshold: DEFAULT_FILL_THRESHOLD,
            compress: None,
        }
    }
}
