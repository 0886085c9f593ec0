use fast_image_resize as fr;
use fr::images::Image;
use thiserror::Error;
use tracing::warn;

use crate::display::sink::{DisplaySink, TargetSize};
use crate::frame::{PackedPixel, Surface};

/// Errors raised while rescaling a surface.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("invalid surface buffer: {0}")]
    Buffer(#[from] fr::ImageBufferError),

    #[error("resize failed: {0}")]
    Resize(#[from] fr::ResizeError),

    #[error("resized buffer does not match {0}x{1}")]
    Size(u32, u32),
}

/// Resize a surface to `target`.
///
/// Uses `fast_image_resize` for SIMD-accelerated resizing. Pixels are fed in
/// B, G, R, A byte order so the fourth channel is treated as alpha.
pub fn scale_surface(surface: &Surface, target: TargetSize) -> Result<Surface, ScaleError> {
    let src = Image::from_vec_u8(
        surface.width(),
        surface.height(),
        surface.to_bgra_bytes(),
        fr::PixelType::U8x4,
    )?;
    let mut dst = Image::new(target.width, target.height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    resizer.resize(&src, &mut dst, None)?;

    let pixels = dst
        .into_vec()
        .chunks_exact(4)
        .map(|px| PackedPixel(u32::from_le_bytes([px[0], px[1], px[2], px[3]])))
        .collect();
    Surface::from_pixels(target.width, target.height, pixels)
        .ok_or(ScaleError::Size(target.width, target.height))
}

/// Sink adapter that fits every surface to the target size before passing
/// it on. Surfaces that already match, or an empty target, pass through.
pub struct ScalingSink<S> {
    inner: S,
}

impl<S: DisplaySink> ScalingSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: DisplaySink> DisplaySink for ScalingSink<S> {
    fn present(&self, surface: Surface, target: TargetSize) {
        if target.is_empty() || target.matches(&surface) {
            self.inner.present(surface, target);
            return;
        }
        match scale_surface(&surface, target) {
            Ok(scaled) => self.inner.present(scaled, target),
            Err(e) => warn!(
                "failed to scale {}x{} surface to {}x{}: {e}",
                surface.width(),
                surface.height(),
                target.width,
                target.height
            ),
        }
    }
}
