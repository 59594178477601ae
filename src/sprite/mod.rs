mod background;
mod bounds;
mod canvas;
mod color;
mod normalizer;

pub use background::{
    BackgroundRemoval, BackgroundRemover, Corner, CornerFailure, DEFAULT_CORNER_THRESHOLD,
    DEFAULT_FILL_THRESHOLD, detect_background_color, flood_clear,
};
pub use bounds::{BoundingBox, sprite_bounds};
pub use canvas::{TRANSPARENT, paste_masked, transparent_canvas};
pub use color::{Color, color_distance};
pub use normalizer::{
    DEFAULT_CROP_PADDING, DEFAULT_INTERMEDIATE_SIZE, FrameNormalizer, NormalizedFrame, fit_within,
};
