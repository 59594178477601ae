use std::collections::VecDeque;

use image::RgbaImage;
use log::{debug, warn};

use super::canvas::TRANSPARENT;
use super::color::Color;
use crate::error::SpriteError;

/// Corner color must be closer than this to the detected background to seed a fill
pub const DEFAULT_CORNER_THRESHOLD: f64 = 30.0;
/// Flood fill grows into neighbors closer than this to the seed color
pub const DEFAULT_FILL_THRESHOLD: f64 = 25.0;

/// Each edge is sampled at roughly this many evenly spaced points
const EDGE_SAMPLES: u32 = 20;

/// Image corner used as a flood fill seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Corners in the order they are tried
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Pixel coordinates of this corner in an image of the given size
    pub fn position(self, width: u32, height: u32) -> (u32, u32) {
        let right = width.saturating_sub(1);
        let bottom = height.saturating_sub(1);
        match self {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (right, 0),
            Corner::BottomLeft => (0, bottom),
            Corner::BottomRight => (right, bottom),
        }
    }
}

/// A corner whose flood fill failed and was skipped
#[derive(Debug, Clone)]
pub struct CornerFailure {
    pub corner: Corner,
    pub x: u32,
    pub y: u32,
    pub reason: String,
}

/// Outcome of background removal on one image
#[derive(Debug, Clone, Default)]
pub struct BackgroundRemoval {
    /// Dominant edge color, `None` for empty images
    pub background: Option<Color>,
    /// Corners a flood fill was started from
    pub filled_corners: Vec<Corner>,
    /// Total pixels cleared across all fills
    pub cleared_pixels: u64,
    /// Corners whose fill failed
    pub skipped: Vec<CornerFailure>,
}

/// Clears background regions connected to the image corners
#[derive(Debug, Clone, Copy)]
pub struct BackgroundRemover {
    pub corner_threshold: f64,
    pub fill_threshold: f64,
}

impl Default for BackgroundRemover {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundRemover {
    pub fn new() -> Self {
        Self {
            corner_threshold: DEFAULT_CORNER_THRESHOLD,
            fill_threshold: DEFAULT_FILL_THRESHOLD,
        }
    }

    pub fn corner_threshold(mut self, threshold: f64) -> Self {
        self.corner_threshold = threshold;
        self
    }

    pub fn fill_threshold(mut self, threshold: f64) -> Self {
        self.fill_threshold = threshold;
        self
    }

    /// Detect the background color and clear every region connected to a
    /// corner that matches it.
    ///
    /// Cleared pixels become transparent black. A failing corner is recorded
    /// in [`BackgroundRemoval::skipped`] and the remaining corners still run.
    pub fn remove(&self, image: &mut RgbaImage) -> BackgroundRemoval {
        let Some(background) = detect_background_color(image) else {
            return BackgroundRemoval::default();
        };
        debug!("Detected background color: {}", background);

        let (width, height) = image.dimensions();
        let seeds: Vec<_> = Corner::ALL
            .iter()
            .map(|&corner| {
                let (x, y) = corner.position(width, height);
                (corner, x, y)
            })
            .collect();

        self.clear_from_seeds(image, background, &seeds)
    }

    fn clear_from_seeds(
        &self,
        image: &mut RgbaImage,
        background: Color,
        seeds: &[(Corner, u32, u32)],
    ) -> BackgroundRemoval {
        let mut report = BackgroundRemoval {
            background: Some(background),
            ..BackgroundRemoval::default()
        };

        for &(corner, x, y) in seeds {
            match self.fill_from_corner(image, background, x, y) {
                Ok(Some(cleared)) => {
                    report.filled_corners.push(corner);
                    report.cleared_pixels += cleared;
                }
                Ok(None) => debug!("Corner {:?} is cleared or not background, skipping", corner),
                Err(e) => {
                    warn!("Flood fill from corner {},{} failed: {}", x, y, e);
                    report.skipped.push(CornerFailure {
                        corner,
                        x,
                        y,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Returns `Ok(None)` when the corner is already cleared or is not
    /// background-like
    fn fill_from_corner(
        &self,
        image: &mut RgbaImage,
        background: Color,
        x: u32,
        y: u32,
    ) -> Result<Option<u64>, SpriteError> {
        let (width, height) = image.dimensions();
        let pixel = *image
            .get_pixel_checked(x, y)
            .ok_or(SpriteError::SeedOutOfBounds {
                x,
                y,
                width,
                height,
            })?;

        // Cleared pixels read as black, which must not seed a second fill
        if pixel == TRANSPARENT {
            return Ok(None);
        }

        if Color::from_pixel(&pixel).distance(background) >= self.corner_threshold {
            return Ok(None);
        }

        flood_clear(image, x, y, self.fill_threshold).map(Some)
    }
}

/// Most frequent color sampled along the four image edges.
///
/// Samples are taken every `max(1, width / 20)` columns along the top then
/// bottom edge, and every `max(1, height / 20)` rows along the left then right
/// edge. On equal counts the color seen first in that order wins.
pub fn detect_background_color(image: &RgbaImage) -> Option<Color> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let x_step = (width / EDGE_SAMPLES).max(1) as usize;
    let y_step = (height / EDGE_SAMPLES).max(1) as usize;
    let columns = || (0..width).step_by(x_step);
    let rows = || (0..height).step_by(y_step);

    let samples = columns()
        .map(|x| (x, 0))
        .chain(columns().map(|x| (x, height - 1)))
        .chain(rows().map(|y| (0, y)))
        .chain(rows().map(|y| (width - 1, y)));

    // Insertion-ordered tally so ties resolve to the earliest sample
    let mut counts: Vec<(Color, usize)> = Vec::new();
    for (x, y) in samples {
        let color = Color::from_pixel(image.get_pixel(x, y));
        match counts.iter_mut().find(|(c, _)| *c == color) {
            Some((_, count)) => *count += 1,
            None => counts.push((color, 1)),
        }
    }

    let mut best: Option<(Color, usize)> = None;
    for (color, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((color, count)),
        }
    }

    best.map(|(color, _)| color)
}

/// Clear the 4-connected region around (x, y) whose colors are within
/// `threshold` of the seed pixel's color. Returns the number of cleared pixels.
pub fn flood_clear(
    image: &mut RgbaImage,
    x: u32,
    y: u32,
    threshold: f64,
) -> Result<u64, SpriteError> {
    let (width, height) = image.dimensions();
    let seed = image
        .get_pixel_checked(x, y)
        .map(Color::from_pixel)
        .ok_or(SpriteError::SeedOutOfBounds {
            x,
            y,
            width,
            height,
        })?;

    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
    let mut visited = vec![false; width as usize * height as usize];
    let mut queue = VecDeque::new();

    visited[index(x, y)] = true;
    queue.push_back((x, y));

    let mut cleared = 0u64;
    while let Some((px, py)) = queue.pop_front() {
        image.put_pixel(px, py, TRANSPARENT);
        cleared += 1;

        let neighbors = [
            px.checked_add(1).filter(|&nx| nx < width).map(|nx| (nx, py)),
            px.checked_sub(1).map(|nx| (nx, py)),
            py.checked_add(1).filter(|&ny| ny < height).map(|ny| (px, ny)),
            py.checked_sub(1).map(|ny| (px, ny)),
        ];

        for (nx, ny) in neighbors.into_iter().flatten() {
            let i = index(nx, ny);
            if visited[i] {
                continue;
            }
            visited[i] = true;

            if Color::from_pixel(image.get_pixel(nx, ny)).distance(seed) < threshold {
                queue.push_back((nx, ny));
            }
        }
    }

    Ok(cleared)
}
