// Colour transforms applied to every pixel of a frame.

pub mod invert;

pub use invert::{invert_channel, Invert};

use crate::frame::{PackedPixel, Pixel};

/// Maps one decoded pixel to one display pixel.
///
/// Implementations must be pure: the pipeline may call `apply` for different
/// pixels of the same frame from several threads at once, in any order.
pub trait ColorTransform: Send + Sync {
    fn apply(&self, pixel: Pixel) -> PackedPixel;

    /// Short name used in log output.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> ColorTransform for F
where
    F: Fn(Pixel) -> PackedPixel + Send + Sync,
{
    fn apply(&self, pixel: Pixel) -> PackedPixel {
        self(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transforms() {
        let passthrough = |p: Pixel| PackedPixel::from_argb(p.a, p.r, p.g, p.b);
        let out = passthrough.apply(Pixel::new(1, 2, 3, 4));
        assert_eq!(out.0, 0x0401_0203);
        assert_eq!(passthrough.name(), "custom");
    }

    #[test]
    fn trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ColorTransform>();
    }
}
