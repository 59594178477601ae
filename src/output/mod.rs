mod format;

pub use format::{save_png, write_frames};
