use image::RgbaImage;

/// A completed sprite sheet
#[derive(Debug)]
pub struct Sheet {
    /// Edge length of every (square) frame cell
    pub frame_size: u32,
    pub rows: u32,
    pub cols: u32,
    /// Rendered sheet image, `cols * frame_size` x `rows * frame_size`
    pub image: RgbaImage,
}

impl Sheet {
    pub fn new(frame_size: u32, rows: u32, cols: u32) -> Self {
        Self {
            frame_size,
            rows,
            cols,
            image: crate::sprite::transparent_canvas(cols * frame_size, rows * frame_size),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
