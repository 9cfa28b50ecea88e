pub mod buffer;
pub mod windowing;

pub use buffer::{GrayscaleImage, from_buffer, load, save, to_buffer};
pub use windowing::{WindowSpec, apply_window};
