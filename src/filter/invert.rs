use crate::filter::ColorTransform;
use crate::frame::{PackedPixel, Pixel};

/// Invert one colour channel as `(256 - v) & 0xFF`.
///
/// This is not `255 - v`: zero maps to zero and 255 maps to 1. Black input
/// therefore stays black, which is the established preview behaviour.
pub const fn invert_channel(v: u8) -> u8 {
    (256 - v as u16) as u8
}

/// Inverts red, green and blue; alpha passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invert;

impl ColorTransform for Invert {
    fn apply(&self, pixel: Pixel) -> PackedPixel {
        PackedPixel::from_argb(
            pixel.a,
            invert_channel(pixel.r),
            invert_channel(pixel.g),
            invert_channel(pixel.b),
        )
    }

    fn name(&self) -> &str {
        "invert"
    }
}
