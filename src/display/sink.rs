use serde::{Deserialize, Serialize};

use crate::frame::Surface;

/// Size of the visible preview area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn matches(&self, surface: &Surface) -> bool {
        self.width == surface.width() && self.height == surface.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Receives rendered surfaces for display.
///
/// `present` is only ever called on the presentation thread. Failures are the
/// sink's own business; the caller never retries a surface.
pub trait DisplaySink: Send + Sync {
    fn present(&self, surface: Surface, target: TargetSize);
}

impl<F> DisplaySink for F
where
    F: Fn(Surface, TargetSize) + Send + Sync,
{
    fn present(&self, surface: Surface, target: TargetSize) {
        self(surface, target)
    }
}
