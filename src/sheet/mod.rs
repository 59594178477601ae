mod builder;
mod types;

pub use builder::SheetAssembler;
pub use types::Sheet;
