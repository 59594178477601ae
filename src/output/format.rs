use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{ImageFormat, RgbaImage};
use log::info;

use crate::cli::CompressionLevel;
use crate::error::SpriteError;
use crate::frames::{FrameBatch, FramePattern};

/// Save an RGBA image as PNG, optionally recompressed with oxipng
pub fn save_png(image: &RgbaImage, path: &Path, compress: Option<CompressionLevel>) -> Result<()> {
    let mut png_data = Cursor::new(Vec::new());
    image
        .write_to(&mut png_data, ImageFormat::Png)
        .map_err(|e| SpriteError::ImageSave {
            path: path.to_path_buf(),
            source: e,
        })?;

    let output_data = if let Some(level) = compress {
        let opts = match level {
            CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
            CompressionLevel::Max => oxipng::Options::max_compression(),
        };
        oxipng::optimize_from_memory(&png_data.into_inner(), &opts).map_err(|e| {
            SpriteError::PngCompress {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?
    } else {
        png_data.into_inner()
    };

    fs::write(path, output_data).map_err(|e| SpriteError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Write every frame of the batch into `output_dir`, named by `pattern`.
///
/// Returns the written paths in frame order.
pub fn write_frames(
    batch: &FrameBatch,
    output_dir: &Path,
    pattern: &FramePattern,
    compress: Option<CompressionLevel>,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(batch.frames.len());

    for frame in &batch.frames {
        let path = output_dir.join(pattern.file_name(frame.index + 1));
        save_png(&frame.image, &path, compress)?;
        info!(
            "Created {} ({}x{})",
            path.display(),
            frame.image.width(),
            frame.image.height()
        );
        paths.push(path);
    }

    Ok(paths)
}
