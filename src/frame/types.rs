use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

/// Callback that hands a frame's backing buffer back to the capture source
/// once the frame is released.
pub type ReleaseHook = Box<dyn FnOnce(Vec<u8>) + Send + Sync>;

/// Pixel layout of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PixelFormat {
    /// Four interleaved 8-bit channels per pixel in R, G, B, A order.
    Rgba8888,
}

impl PixelFormat {
    /// Number of bytes one pixel occupies in the raw buffer.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8888 => 4,
        }
    }
}

/// A single frame as delivered by the capture source.
///
/// The frame owns its pixel buffer until it is released. Release happens
/// exactly once: either through [`RawFrame::release`] or when the frame is
/// dropped. If a release hook is attached, it receives the buffer so the
/// source can reuse the allocation.
pub struct RawFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Layout of `data`.
    pub format: PixelFormat,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
    /// Monotonic number assigned by the capture source.
    pub sequence: u64,
    data: Vec<u8>,
    release: Option<ReleaseHook>,
}

impl RawFrame {
    /// Wrap an RGBA buffer with no release hook.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8888,
            timestamp_us: 0,
            sequence: 0,
            data,
            release: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp_us: u64) -> Self {
        self.timestamp_us = timestamp_us;
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Attach the callback invoked when the frame is released.
    pub fn with_release(mut self, hook: ReleaseHook) -> Self {
        self.release = Some(hook);
        self
    }

    /// Raw pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels the declared dimensions describe.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Minimum buffer length required by the declared dimensions.
    pub fn expected_len(&self) -> usize {
        self.pixel_count().saturating_mul(self.format.bytes_per_pixel())
    }

    /// Return the buffer to the capture source. Consumes the frame, so a
    /// second release cannot be expressed.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for RawFrame {
    fn drop(&mut self) {
        if let Some(hook) = self.release.take() {
            hook(std::mem::take(&mut self.data));
        }
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("timestamp_us", &self.timestamp_us)
            .field("sequence", &self.sequence)
            .field("len", &self.data.len())
            .field("has_release_hook", &self.release.is_some())
            .finish()
    }
}

/// One decoded pixel, channels in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A display pixel packed as `alpha<<24 | red<<16 | green<<8 | blue`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct PackedPixel(pub u32);

impl PackedPixel {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Debug for PackedPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedPixel({:#010X})", self.0)
    }
}

/// A fully rendered frame ready for presentation, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<PackedPixel>,
}

impl Surface {
    /// Build a surface, returning `None` unless `pixels.len() == width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<PackedPixel>) -> Option<Self> {
        if pixels.len() != (width as usize).saturating_mul(height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[PackedPixel] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PackedPixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Zero-copy byte view in native endianness, for uploading to a texture
    /// that expects packed 32-bit pixels.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Copy into B, G, R, A byte order regardless of host endianness.
    pub fn to_bgra_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.0.to_le_bytes())
            .collect()
    }

    pub fn into_pixels(self) -> Vec<PackedPixel> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_hook(counter: &Arc<AtomicUsize>) -> ReleaseHook {
        let counter = Arc::clone(counter);
        Box::new(move |_buf| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn expected_len_is_four_bytes_per_pixel() {
        let frame = RawFrame::new(3, 2, vec![0; 24]);
        assert_eq!(frame.pixel_count(), 6);
        assert_eq!(frame.expected_len(), 24);
    }

    #[test]
    fn explicit_release_runs_hook_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let frame = RawFrame::new(1, 1, vec![0; 4]).with_release(counting_hook(&released));
        frame.release();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_runs_hook_once() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let _frame = RawFrame::new(1, 1, vec![0; 4]).with_release(counting_hook(&released));
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_hook_receives_the_buffer() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let frame = RawFrame::new(1, 1, vec![1, 2, 3, 4]).with_release(Box::new(move |buf| {
            let _ = tx.send(buf);
        }));
        frame.release();
        assert_eq!(rx.try_recv().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn packed_pixel_channel_accessors() {
        let p = PackedPixel::from_argb(0x28, 0xF6, 0xE6, 0xE2);
        assert_eq!(p.0, 0x28F6_E6E2);
        assert_eq!(p.alpha(), 0x28);
        assert_eq!(p.red(), 0xF6);
        assert_eq!(p.green(), 0xE6);
        assert_eq!(p.blue(), 0xE2);
    }

    #[test]
    fn packed_pixel_debug_is_hex() {
        assert_eq!(format!("{:?}", PackedPixel(0xFF)), "PackedPixel(0x000000FF)");
    }

    #[test]
    fn surface_rejects_mismatched_length() {
        assert!(Surface::from_pixels(2, 2, vec![PackedPixel(0); 3]).is_none());
        assert!(Surface::from_pixels(2, 2, vec![PackedPixel(0); 4]).is_some());
    }

    #[test]
    fn surface_pixel_is_row_major() {
        let pixels = (0..6).map(PackedPixel).collect();
        let surface = Surface::from_pixels(3, 2, pixels).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(PackedPixel(0)));
        assert_eq!(surface.pixel(2, 0), Some(PackedPixel(2)));
        assert_eq!(surface.pixel(0, 1), Some(PackedPixel(3)));
        assert_eq!(surface.pixel(3, 0), None);
        assert_eq!(surface.pixel(0, 2), None);
    }

    #[test]
    fn bgra_bytes_are_little_endian() {
        let surface = Surface::from_pixels(1, 1, vec![PackedPixel(0x4433_2211)]).unwrap();
        assert_eq!(surface.to_bgra_bytes(), vec![0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn as_bytes_covers_every_pixel() {
        let surface = Surface::from_pixels(2, 1, vec![PackedPixel(1), PackedPixel(2)]).unwrap();
        assert_eq!(surface.as_bytes().len(), 8);
    }

    #[test]
    fn raw_frame_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RawFrame>();
    }
}
