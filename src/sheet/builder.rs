use std::path::{Path, PathBuf};

use anyhow::Result;
use image::RgbaImage;
use log::info;

use super::Sheet;
use crate::cli::CompressionLevel;
use crate::error::SpriteError;
use crate::frames::{FrameGrid, load_source};
use crate::output::save_png;
use crate::sprite::paste_masked;

/// Lays processed frames out on a grid-shaped sprite sheet
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetAssembler {
    pub grid: FrameGrid,
}

impl SheetAssembler {
    pub fn new(grid: FrameGrid) -> Self {
        Self { grid }
    }

    /// Compose already-decoded frames, in grid order.
    ///
    /// The cell size is taken from the first frame; every frame must be that
    /// size and square.
    pub fn assemble(&self, frames: &[RgbaImage]) -> Result<Sheet, SpriteError> {
        let expected = self.grid.frame_count();
        if frames.len() != expected {
            return Err(SpriteError::FrameCountMismatch {
                expected,
                actual: frames.len(),
            });
        }

        let frame_size = frames.first().map(|f| f.width()).unwrap_or(0);
        for (index, frame) in frames.iter().enumerate() {
            let (width, height) = frame.dimensions();
            if width != frame_size || height != frame_size {
                return Err(SpriteError::FrameSizeMismatch {
                    index,
                    width,
                    height,
                    expected: frame_size,
                });
            }
        }

        let mut sheet = Sheet::new(frame_size, self.grid.rows, self.grid.cols);
        for (index, frame) in (0u32..).zip(frames) {
            let (col, row) = self.grid.cell(index);
            paste_masked(&mut sheet.image, frame, col * frame_size, row * frame_size);
        }

        Ok(sheet)
    }

    /// Load the frame files and compose them.
    ///
    /// Every path is checked before anything is decoded; the first missing
    /// one is reported as [`SpriteError::MissingFrame`].
    pub fn assemble_from_paths(&self, paths: &[PathBuf]) -> Result<Sheet> {
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            return Err(SpriteError::MissingFrame(missing.clone()).into());
        }

        let frames = paths
            .iter()
            .map(|path| load_source(path))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assemble(&frames)?)
    }

    /// Compose the frame files and write the sheet to `output`.
    ///
    /// Nothing is written unless every frame loads.
    pub fn write_from_paths(
        &self,
        paths: &[PathBuf],
        output: &Path,
        compress: Option<CompressionLevel>,
    ) -> Result<Sheet> {
        let sheet = self.assemble_from_paths(paths)?;
        save_png(&sheet.image, output, compress)?;
        info!(
            "Created sprite sheet {} ({}x{})",
            output.display(),
            sheet.width(),
            sheet.height()
        );
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_frames(size: u32) -> Vec<RgbaImage> {
        [
            Rgba([255, 0, 0, 255]),
            Rgba([0, 255, 0, 255]),
            Rgba([0, 0, 255, 255]),
            Rgba([255, 255, 0, 255]),
        ]
        .into_iter()
        .map(|color| RgbaImage::from_pixel(size, size, color))
        .collect()
    }

    #[test]
    fn test_assemble_places_frames_on_grid() {
        let frames = solid_frames(8);
        let sheet = SheetAssembler::default().assemble(&frames).unwrap();

        assert_eq!((sheet.width(), sheet.height()), (16, 16));
        assert_eq!(sheet.frame_size, 8);
        assert_eq!(*sheet.image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*sheet.image.get_pixel(8, 0), Rgba([0, 255, 0, 255]));
        assert_eq!(*sheet.image.get_pixel(0, 8), Rgba([0, 0, 255, 255]));
        assert_eq!(*sheet.image.get_pixel(15, 15), Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn test_assemble_keeps_transparency() {
        let mut frames = solid_frames(4);
        frames[1] = RgbaImage::new(4, 4);

        let sheet = SheetAssembler::default().assemble(&frames).unwrap();

        assert_eq!(sheet.image.get_pixel(5, 1)[3], 0);
    }

    #[test]
    fn test_assemble_wide_grid() {
        let grid = FrameGrid::new(1, 4).unwrap();
        let sheet = SheetAssembler::new(grid)
            .assemble(&solid_frames(8))
            .unwrap();

        assert_eq!((sheet.width(), sheet.height()), (32, 8));
        assert_eq!(*sheet.image.get_pixel(24, 0), Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn test_assemble_wrong_frame_count() {
        let frames = solid_frames(8);
        let result = SheetAssembler::default().assemble(&frames[..3]);
        assert!(matches!(
            result,
            Err(SpriteError::FrameCountMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_assemble_mismatched_frame_size() {
        let mut frames = solid_frames(8);
        frames[2] = RgbaImage::new(8, 6);
        let result = SheetAssembler::default().assemble(&frames);
        assert!(matches!(
            result,
            Err(SpriteError::FrameSizeMismatch { index: 2, .. })
        ));
    }

    #[test]
    fn test_missing_frame_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (1..=4)
            .map(|n| dir.path().join(format!("frame_{}.png", n)))
            .collect();
        for (path, frame) in paths.iter().zip(solid_frames(8)).take(3) {
            frame.save(path).unwrap();
        }
        let output = dir.path().join("sheet.png");

        let err = SheetAssembler::default()
            .write_from_paths(&paths, &output, None)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SpriteError>(),
            Some(SpriteError::MissingFrame(p)) if *p == paths[3]
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_write_from_paths() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (1..=4)
            .map(|n| dir.path().join(format!("frame_{}.png", n)))
            .collect();
        for (path, frame) in paths.iter().zip(solid_frames(8)) {
            frame.save(path).unwrap();
        }
        let output = dir.path().join("sheet.png");

        let sheet = SheetAssembler::default()
            .write_from_paths(&paths, &output, None)
            .unwrap();

        assert_eq!((sheet.width(), sheet.height()), (16, 16));
        let written = image::open(&output).unwrap().into_rgba8();
        assert_eq!(written.dimensions(), (16, 16));
        assert_eq!(*written.get_pixel(8, 8), Rgba([255, 255, 0, 255]));
    }
}
