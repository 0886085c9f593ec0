use crate::frame::types::{Pixel, RawFrame};
use crate::pipeline::error::{PipelineError, Result};

const BYTES_PER_PIXEL: usize = 4;

/// Decode pixel `index` of an RGBA frame.
///
/// Reads bytes `index*4 .. index*4+3` as unsigned values. Fails with
/// `OutOfBounds` when the last of those bytes lies past the buffer end.
pub fn decode_pixel(frame: &RawFrame, index: usize) -> Result<Pixel> {
    decode_at(frame.data(), index)
}

/// Slice-level variant of [`decode_pixel`].
pub fn decode_at(data: &[u8], index: usize) -> Result<Pixel> {
    let out_of_bounds = || PipelineError::OutOfBounds {
        index,
        len: data.len(),
    };
    let start = index.checked_mul(BYTES_PER_PIXEL).ok_or_else(out_of_bounds)?;
    let bytes = start
        .checked_add(BYTES_PER_PIXEL)
        .and_then(|end| data.get(start..end))
        .ok_or_else(out_of_bounds)?;
    Ok(Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3]))
}
