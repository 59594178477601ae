use image::RgbaImage;
use image::imageops::{self, FilterType};

use super::bounds::BoundingBox;
use super::canvas::{paste_masked, transparent_canvas};
use crate::error::SpriteError;

/// Transparent pixels kept around the detected content before scaling
pub const DEFAULT_CROP_PADDING: u32 = 2;
/// Content larger than this on either side is smoothly downscaled first
pub const DEFAULT_INTERMEDIATE_SIZE: u32 = 128;
/// Total border (2px per side) left free around the sprite on the canvas
const SPRITE_MARGIN: u32 = 4;
/// Sprites sit one pixel below center so characters touch the ground
const VERTICAL_BIAS: i64 = 1;

/// A frame centered on its fixed-size canvas
#[derive(Debug, Clone)]
pub struct NormalizedFrame {
    /// Canvas of exactly `target_size` x `target_size`
    pub image: RgbaImage,
    /// Size of the content after cropping and scaling
    pub content_width: u32,
    pub content_height: u32,
    /// Where the content was pasted on the canvas
    pub x: u32,
    pub y: u32,
}

/// Crops, scales and centers frames onto a square transparent canvas
#[derive(Debug, Clone, Copy)]
pub struct FrameNormalizer {
    pub target_size: u32,
    pub crop_padding: u32,
    pub intermediate_size: u32,
}

impl FrameNormalizer {
    pub fn new(target_size: u32) -> Self {
        Self {
            target_size,
            crop_padding: DEFAULT_CROP_PADDING,
            intermediate_size: DEFAULT_INTERMEDIATE_SIZE,
        }
    }

    pub fn crop_padding(mut self, padding: u32) -> Self {
        self.crop_padding = padding;
        self
    }

    /// Largest sprite side that fits inside the canvas margin
    pub fn max_sprite_size(&self) -> u32 {
        self.target_size.saturating_sub(SPRITE_MARGIN)
    }

    /// Normalize a frame given the bounds of its visible content.
    ///
    /// With `bounds == None` the whole frame is used as content.
    pub fn normalize(
        &self,
        frame: &RgbaImage,
        bounds: Option<BoundingBox>,
    ) -> Result<NormalizedFrame, SpriteError> {
        if self.target_size <= SPRITE_MARGIN {
            return Err(SpriteError::InvalidTargetSize(self.target_size));
        }

        let cropped = match bounds {
            Some(bounds) => {
                let region = bounds.expand(self.crop_padding, frame.width(), frame.height());
                imageops::crop_imm(
                    frame,
                    region.left,
                    region.top,
                    region.width(),
                    region.height(),
                )
                .to_image()
            }
            None => frame.clone(),
        };

        let sprite = self.scale_to_fit(fit_within(cropped, self.intermediate_size));
        let (content_width, content_height) = sprite.dimensions();
        let (x, y) = self.placement(content_width, content_height);

        let mut canvas = transparent_canvas(self.target_size, self.target_size);
        paste_masked(&mut canvas, &sprite, x, y);

        Ok(NormalizedFrame {
            image: canvas,
            content_width,
            content_height,
            x,
            y,
        })
    }

    /// Nearest-neighbor downscale so both sides fit `max_sprite_size`. Never upscales.
    pub fn scale_to_fit(&self, img: RgbaImage) -> RgbaImage {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return img;
        }

        let max_size = f64::from(self.max_sprite_size());
        let scale = (max_size / f64::from(w)).min(max_size / f64::from(h));
        if scale >= 1.0 {
            return img;
        }

        let new_width = floor_scaled(w, scale).max(1);
        let new_height = floor_scaled(h, scale).max(1);
        imageops::resize(&img, new_width, new_height, FilterType::Nearest)
    }

    /// Top-left canvas position for content of the given size: horizontally
    /// centered, biased one pixel down, clamped inside the canvas.
    pub fn placement(&self, width: u32, height: u32) -> (u32, u32) {
        let size = i64::from(self.target_size);
        let free_x = size - i64::from(width);
        let free_y = size - i64::from(height);

        let x = free_x.div_euclid(2);
        let y = free_y.div_euclid(2) + VERTICAL_BIAS;

        (clamp_offset(x, free_x), clamp_offset(y, free_y))
    }
}

/// Smoothly downscale so neither side exceeds `max_side`, keeping aspect ratio
pub fn fit_within(img: RgbaImage, max_side: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w <= max_side && h <= max_side {
        return img;
    }

    let max_side = f64::from(max_side);
    let scale = (max_side / f64::from(w)).min(max_side / f64::from(h));
    let new_width = round_scaled(w, scale).max(1);
    let new_height = round_scaled(h, scale).max(1);
    imageops::resize(&img, new_width, new_height, FilterType::Lanczos3)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "scale is in (0, 1), so the result is non-negative and below the input"
)]
fn floor_scaled(value: u32, scale: f64) -> u32 {
    (f64::from(value) * scale) as u32
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "scale is in (0, 1), so the result is non-negative and below the input"
)]
fn round_scaled(value: u32, scale: f64) -> u32 {
    (f64::from(value) * scale).round() as u32
}

fn clamp_offset(offset: i64, max: i64) -> u32 {
    u32::try_from(offset.min(max).max(0)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::bounds::sprite_bounds;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn opaque_count(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p[3] > 0).count()
    }

    #[test]
    fn test_output_is_always_target_size() {
        let normalizer = FrameNormalizer::new(32);
        let frames = [
            RgbaImage::from_pixel(200, 50, RED),
            RgbaImage::from_pixel(10, 300, RED),
            RgbaImage::from_pixel(3, 3, RED),
            RgbaImage::new(50, 50),
        ];

        for frame in &frames {
            let result = normalizer.normalize(frame, sprite_bounds(frame)).unwrap();
            assert_eq!(result.image.dimensions(), (32, 32));
        }
    }

    #[test]
    fn test_small_content_is_not_scaled() {
        let mut frame = RgbaImage::new(40, 40);
        for y in 10..20 {
            for x in 5..25 {
                frame.put_pixel(x, y, RED);
            }
        }

        let bounds = sprite_bounds(&frame);
        let result = FrameNormalizer::new(32).normalize(&frame, bounds).unwrap();

        // 20x10 content plus 2px padding on each side
        assert_eq!((result.content_width, result.content_height), (24, 14));
        assert_eq!((result.x, result.y), (4, 10));
        assert_eq!(opaque_count(&result.image), 200);
        assert_eq!(*result.image.get_pixel(6, 12), RED);
        assert_eq!(*result.image.get_pixel(25, 21), RED);
        assert_eq!(result.image.get_pixel(5, 12)[3], 0);
        assert_eq!(result.image.get_pixel(26, 21)[3], 0);
    }

    #[test]
    fn test_transparent_frame_uses_whole_frame() {
        let frame = RgbaImage::new(50, 50);
        let bounds = sprite_bounds(&frame);
        assert!(bounds.is_none());

        let result = FrameNormalizer::new(32).normalize(&frame, bounds).unwrap();

        // 50 * (28 / 50) = 28
        assert_eq!((result.content_width, result.content_height), (28, 28));
        assert_eq!(result.image.dimensions(), (32, 32));
        assert_eq!(opaque_count(&result.image), 0);
    }

    #[test]
    fn test_large_content_goes_through_intermediate_size() {
        let frame = RgbaImage::from_pixel(300, 150, RED);
        let result = FrameNormalizer::new(32)
            .normalize(&frame, sprite_bounds(&frame))
            .unwrap();

        // 300x150 -> 128x64 -> floor(128 * 28/128) x floor(64 * 28/128)
        assert_eq!((result.content_width, result.content_height), (28, 14));
        assert_eq!((result.x, result.y), (2, 10));
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let img = RgbaImage::new(128, 40);
        assert_eq!(fit_within(img, 128).dimensions(), (128, 40));
    }

    #[test]
    fn test_fit_within_preserves_aspect() {
        let img = RgbaImage::new(100, 400);
        assert_eq!(fit_within(img, 128).dimensions(), (32, 128));
    }

    #[test]
    fn test_scale_to_fit_never_upscales() {
        let normalizer = FrameNormalizer::new(64);
        let img = RgbaImage::new(10, 60);
        assert_eq!(normalizer.scale_to_fit(img).dimensions(), (10, 60));
    }

    #[test]
    fn test_scale_to_fit_extreme_aspect_keeps_one_pixel() {
        let normalizer = FrameNormalizer::new(32);
        let img = RgbaImage::new(128, 1);
        assert_eq!(normalizer.scale_to_fit(img).dimensions(), (28, 1));
    }

    #[test]
    fn test_placement_vertical_bias() {
        let normalizer = FrameNormalizer::new(32);
        assert_eq!(normalizer.placement(28, 28), (2, 3));
        assert_eq!(normalizer.placement(10, 11), (11, 11));
        // Odd free space rounds down before the bias
        assert_eq!(normalizer.placement(27, 27), (2, 3));
    }

    #[test]
    fn test_placement_clamps_to_canvas() {
        let normalizer = FrameNormalizer::new(64);
        // Bias would push a full-height sprite off the canvas
        assert_eq!(normalizer.placement(64, 64), (0, 0));
        assert_eq!(normalizer.placement(64, 63), (0, 1));
        assert_eq!(normalizer.placement(80, 80), (0, 0));
    }

    #[test]
    fn test_invalid_target_size() {
        let frame = RgbaImage::from_pixel(8, 8, RED);
        let result = FrameNormalizer::new(4).normalize(&frame, None);
        assert!(matches!(result, Err(SpriteError::InvalidTargetSize(4))));
    }
}
