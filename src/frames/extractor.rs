use std::path::Path;

use anyhow::Result;
use image::{ImageReader, RgbaImage, imageops};
use log::{debug, info};
use rayon::prelude::*;

use crate::error::SpriteError;
use crate::sprite::{
    BackgroundRemover, BoundingBox, Color, CornerFailure, FrameNormalizer, sprite_bounds,
};

/// Default edge length of the square output frames
pub const DEFAULT_TARGET_SIZE: u32 = 32;

/// Layout of frames in the source image, read left-to-right, top-to-bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGrid {
    pub rows: u32,
    pub cols: u32,
}

impl Default for FrameGrid {
    fn default() -> Self {
        Self { rows: 2, cols: 2 }
    }
}

impl FrameGrid {
    pub fn new(rows: u32, cols: u32) -> Result<Self, SpriteError> {
        if rows == 0 || cols == 0 {
            return Err(SpriteError::InvalidGrid { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn frame_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// (column, row) of the frame at `index`
    pub fn cell(&self, index: u32) -> (u32, u32) {
        (index % self.cols, index / self.cols)
    }

    /// Size of one frame in a `width` x `height` source.
    ///
    /// Uses floor division, so trailing pixels of a source that does not
    /// divide evenly are dropped. `None` if a frame would be empty.
    pub fn frame_size(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let frame_width = width / self.cols;
        let frame_height = height / self.rows;
        (frame_width > 0 && frame_height > 0).then_some((frame_width, frame_height))
    }
}

/// One frame after the full pipeline
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    /// 0-based position in the grid
    pub index: usize,
    /// Final `target_size` x `target_size` canvas
    pub image: RgbaImage,
    /// Background color detected on the frame edges
    pub background: Option<Color>,
    /// Content bounds after background removal, `None` if fully transparent
    pub bounds: Option<BoundingBox>,
    pub content_width: u32,
    pub content_height: u32,
    /// Content position on the canvas
    pub x: u32,
    pub y: u32,
}

/// Non-fatal problem hit while processing a frame
#[derive(Debug, Clone)]
pub struct FrameWarning {
    pub frame: usize,
    pub failure: CornerFailure,
}

/// Ordered frames of one source image plus the recovered failures
#[derive(Debug, Clone, Default)]
pub struct FrameBatch {
    pub frames: Vec<ProcessedFrame>,
    pub warnings: Vec<FrameWarning>,
}

/// Slices a source image into a grid and runs every frame through
/// background removal, bounds detection and normalization
#[derive(Debug, Clone, Copy)]
pub struct FrameExtractor {
    pub grid: FrameGrid,
    pub remover: BackgroundRemover,
    pub normalizer: FrameNormalizer,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_SIZE)
    }
}

impl FrameExtractor {
    pub fn new(target_size: u32) -> Self {
        Self {
            grid: FrameGrid::default(),
            remover: BackgroundRemover::new(),
            normalizer: FrameNormalizer::new(target_size),
        }
    }

    pub fn grid(mut self, grid: FrameGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn remover(mut self, remover: BackgroundRemover) -> Self {
        self.remover = remover;
        self
    }

    pub fn normalizer(mut self, normalizer: FrameNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Process every frame of `source`. Any failing frame fails the batch.
    pub fn process(&self, source: &RgbaImage) -> Result<FrameBatch, SpriteError> {
        let (width, height) = source.dimensions();
        let (frame_width, frame_height) =
            self.grid
                .frame_size(width, height)
                .ok_or(SpriteError::SourceTooSmall {
                    width,
                    height,
                    rows: self.grid.rows,
                    cols: self.grid.cols,
                })?;

        info!(
            "Processing {}x{} source image into {} frames of {}x{}...",
            width,
            height,
            self.grid.frame_count(),
            frame_width,
            frame_height
        );

        let frame_count = self.grid.rows * self.grid.cols;
        let results: Result<Vec<_>, SpriteError> = (0..frame_count)
            .into_par_iter()
            .map(|index| {
                let (col, row) = self.grid.cell(index);
                let frame = imageops::crop_imm(
                    source,
                    col * frame_width,
                    row * frame_height,
                    frame_width,
                    frame_height,
                )
                .to_image();
                self.process_frame(index as usize, frame)
            })
            .collect();

        let mut batch = FrameBatch::default();
        for (frame, failures) in results? {
            batch
                .warnings
                .extend(failures.into_iter().map(|failure| FrameWarning {
                    frame: frame.index,
                    failure,
                }));
            batch.frames.push(frame);
        }

        Ok(batch)
    }

    /// Run a single frame through the pipeline
    pub fn process_frame(
        &self,
        index: usize,
        mut frame: RgbaImage,
    ) -> Result<(ProcessedFrame, Vec<CornerFailure>), SpriteError> {
        let removal = self.remover.remove(&mut frame);
        let bounds = sprite_bounds(&frame);
        let normalized = self.normalizer.normalize(&frame, bounds)?;

        let size = self.normalizer.target_size;
        debug!(
            "Frame {}: centered {}x{} sprite at ({}, {}) in {}x{} canvas",
            index + 1,
            normalized.content_width,
            normalized.content_height,
            normalized.x,
            normalized.y,
            size,
            size
        );

        let processed = ProcessedFrame {
            index,
            image: normalized.image,
            background: removal.background,
            bounds,
            content_width: normalized.content_width,
            content_height: normalized.content_height,
            x: normalized.x,
            y: normalized.y,
        };

        Ok((processed, removal.skipped))
    }
}

/// Load a source image as RGBA
pub fn load_source(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(SpriteError::InputNotFound(path.to_path_buf()).into());
    }

    let img = ImageReader::open(path)
        .map_err(|e| SpriteError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| SpriteError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .into_rgba8();

    Ok(img)
}

/// Load `source_path` and process all of its frames
pub fn extract_frames(source_path: &Path, extractor: &FrameExtractor) -> Result<FrameBatch> {
    let source = load_source(source_path)?;
    Ok(extractor.process(&source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn fill(img: &mut RgbaImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgba<u8>) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, color);
            }
        }
    }

    #[test]
    fn test_grid_cells_read_row_major() {
        let grid = FrameGrid::default();
        assert_eq!(grid.frame_count(), 4);
        assert_eq!(grid.cell(0), (0, 0));
        assert_eq!(grid.cell(1), (1, 0));
        assert_eq!(grid.cell(2), (0, 1));
        assert_eq!(grid.cell(3), (1, 1));
    }

    #[test]
    fn test_grid_rejects_empty() {
        assert!(matches!(
            FrameGrid::new(0, 2),
            Err(SpriteError::InvalidGrid { rows: 0, cols: 2 })
        ));
    }

    #[test]
    fn test_frame_size_drops_odd_pixels() {
        let grid = FrameGrid::default();
        assert_eq!(grid.frame_size(41, 43), Some((20, 21)));
        assert_eq!(grid.frame_size(1, 10), None);
    }

    #[test]
    fn test_source_too_small() {
        let source = RgbaImage::new(1, 1);
        let result = FrameExtractor::new(32).process(&source);
        assert!(matches!(result, Err(SpriteError::SourceTooSmall { .. })));
    }

    #[test]
    fn test_frames_keep_grid_order() {
        // Each 40x40 quadrant: white background with a distinct 10x10 square
        let colors = [
            Rgba([255, 0, 0, 255]),
            Rgba([0, 255, 0, 255]),
            Rgba([0, 0, 255, 255]),
            Rgba([255, 255, 0, 255]),
        ];
        let mut source = RgbaImage::from_pixel(80, 80, WHITE);
        for (i, color) in colors.iter().enumerate() {
            let x0 = (i as u32 % 2) * 40;
            let y0 = (i as u32 / 2) * 40;
            fill(&mut source, x0 + 15, y0 + 15, 10, 10, *color);
        }

        let batch = FrameExtractor::new(32).process(&source).unwrap();

        assert_eq!(batch.frames.len(), 4);
        assert!(batch.warnings.is_empty());
        for (i, frame) in batch.frames.iter().enumerate() {
            assert_eq!(frame.index, i);
            assert_eq!(frame.image.dimensions(), (32, 32));
            assert_eq!(frame.background, Some(Color::new(255, 255, 255)));
            assert_eq!(frame.bounds, Some(BoundingBox::new(15, 15, 25, 25)));
            // 10x10 square plus padding is 14x14, centered at (9, 10)
            assert_eq!((frame.x, frame.y), (9, 10));
            assert_eq!(*frame.image.get_pixel(16, 16), colors[i]);
            assert_eq!(frame.image.get_pixel(0, 0)[3], 0);
        }
    }

    #[test]
    fn test_red_square_on_white_frame() {
        let mut frame = RgbaImage::from_pixel(128, 128, WHITE);
        fill(&mut frame, 0, 0, 64, 64, RED);

        let (processed, failures) = FrameExtractor::new(64).process_frame(0, frame).unwrap();

        assert!(failures.is_empty());
        assert_eq!(processed.background, Some(Color::new(255, 255, 255)));
        assert_eq!(processed.bounds, Some(BoundingBox::new(0, 0, 64, 64)));
        assert_eq!(processed.image.dimensions(), (64, 64));
        // 64x64 square plus 2px padding is 66x66, scaled down to fit 60
        assert_eq!((processed.content_width, processed.content_height), (60, 60));
        assert_eq!((processed.x, processed.y), (2, 3));
        assert_eq!(*processed.image.get_pixel(32, 32), RED);
        assert_eq!(processed.image.get_pixel(0, 0)[3], 0);
        assert_eq!(processed.image.get_pixel(63, 63)[3], 0);
        // No white survives the background removal
        assert!(processed.image.pixels().all(|p| *p != WHITE));
    }

    #[test]
    fn test_transparent_frame_keeps_canvas_size() {
        let (processed, _) = FrameExtractor::new(32)
            .process_frame(0, RgbaImage::new(50, 50))
            .unwrap();

        assert_eq!(processed.bounds, None);
        assert_eq!(processed.image.dimensions(), (32, 32));
        assert!(processed.image.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");

        let err = extract_frames(&path, &FrameExtractor::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SpriteError>(),
            Some(SpriteError::InputNotFound(p)) if *p == path
        ));
    }

    #[test]
    fn test_unreadable_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let err = extract_frames(&path, &FrameExtractor::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SpriteError>(),
            Some(SpriteError::ImageLoad { .. })
        ));
    }
}
