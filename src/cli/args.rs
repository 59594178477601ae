use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spritecut")]
#[command(
    version,
    about = "Cut a multi-frame sprite image into clean game frames and a sprite sheet",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract the frames and build the sprite sheet
    Process(CommonArgs),
    /// Extract the frames only
    Frames(CommonArgs),
    /// Build a sprite sheet from previously extracted frames
    Sheet(SheetArgs),
    /// Write a starter config file
    Init(InitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Source image containing the frame grid
    #[arg(required_unless_present = "config")]
    pub source: Option<PathBuf>,

    /// Load settings from a JSON config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the extracted frames [default: frames]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sprite sheet path [default: <output>_sheet.png]
    #[arg(long, value_name = "FILE")]
    pub sheet: Option<PathBuf>,

    /// Edge length of the square output frames [default: 32]
    #[arg(short, long, value_name = "PIXELS")]
    pub size: Option<u32>,

    /// Frame rows in the source image [default: 2]
    #[arg(long)]
    pub rows: Option<u32>,

    /// Frame columns in the source image [default: 2]
    #[arg(long)]
    pub cols: Option<u32>,

    /// Frame file name pattern, {n} is the 1-based frame number [default: frame_{n}.png]
    #[arg(long)]
    pub pattern: Option<String>,

    /// Transparent border kept around the sprite before scaling [default: 2]
    #[arg(long, value_name = "PIXELS")]
    pub crop_padding: Option<u32>,

    /// Max color distance from a corner to the background to start a fill [default: 30]
    #[arg(long)]
    pub corner_threshold: Option<f64>,

    /// Max color distance from the seed pixel for the fill to spread [default: 25]
    #[arg(long)]
    pub fill_threshold: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,
}

#[derive(Args, Debug, Clone)]
pub struct SheetArgs {
    /// Directory holding the extracted frames [default: frames]
    pub frames: Option<PathBuf>,

    /// Load settings from a JSON config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sprite sheet path [default: <frames>_sheet.png]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Frame rows in the sheet [default: 2]
    #[arg(long)]
    pub rows: Option<u32>,

    /// Frame columns in the sheet [default: 2]
    #[arg(long)]
    pub cols: Option<u32>,

    /// Frame file name pattern, {n} is the 1-based frame number [default: frame_{n}.png]
    #[arg(long)]
    pub pattern: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Config file to create
    #[arg(default_value = "spritecut.json")]
    pub path: PathBuf,

    /// Source image to record in the config
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Edge length of the square output frames
    #[arg(short, long, value_name = "PIXELS", default_value_t = 64)]
    pub size: u32,

    /// Overwrite an existing config file
    #[arg(short, long)]
    pub force: bool,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}
