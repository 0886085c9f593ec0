// Frame model: raw capture frames and display surfaces.

pub mod decode;
pub mod types;

pub use types::{PackedPixel, Pixel, PixelFormat, RawFrame, ReleaseHook, Surface};
