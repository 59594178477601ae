use image::{Rgba, RgbaImage};

/// Fully transparent black, the value cleared pixels are set to
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Allocate a fully transparent canvas
pub fn transparent_canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, TRANSPARENT)
}

/// Paste `source` onto `dest` at (x, y) using the source alpha as a mask.
///
/// Pixels with non-zero alpha replace the destination pixel outright; no
/// blending happens. Pixels falling outside `dest` are dropped.
pub fn paste_masked(dest: &mut RgbaImage, source: &RgbaImage, x: u32, y: u32) {
    let (dest_w, dest_h) = dest.dimensions();

    for (sx, sy, pixel) in source.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        let dx = x.saturating_add(sx);
        let dy = y.saturating_add(sy);
        if dx < dest_w && dy < dest_h {
            dest.put_pixel(dx, dy, *pixel);
        }
    }
}
