use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{trace, warn};

use crate::filter::{ColorTransform, Invert};
use crate::frame::decode::decode_at;
use crate::frame::{PackedPixel, RawFrame, Surface};
use crate::pipeline::error::{PipelineError, Result};

/// Turns raw RGBA frames into packed display surfaces.
///
/// Every pixel goes through the decoder and the configured transform. With
/// more than one worker, rows are rendered in parallel on a thread pool owned
/// by the pipeline; the result is identical to the sequential path.
pub struct FramePipeline {
    transform: Arc<dyn ColorTransform>,
    workers: usize,
    pool: Option<ThreadPool>,
}

impl FramePipeline {
    pub fn new(transform: Arc<dyn ColorTransform>) -> Self {
        Self {
            transform,
            workers: 1,
            pool: None,
        }
    }

    /// Pipeline with the channel-inverting transform.
    pub fn inverting() -> Self {
        Self::new(Arc::new(Invert))
    }

    /// Number of threads used per frame. Zero is treated as one. If the pool
    /// cannot be built the pipeline stays sequential.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.pool = None;
        if self.workers == 1 {
            return self;
        }

        let built = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("frame-render-{i}"))
            .build();
        match built {
            Ok(pool) => self.pool = Some(pool),
            Err(e) => {
                warn!(
                    "failed to build {}-thread render pool, rendering sequentially: {e}",
                    self.workers
                );
                self.workers = 1;
            }
        }
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn transform_name(&self) -> &str {
        self.transform.name()
    }

    /// Render `frame` and release it.
    ///
    /// The frame is released exactly once whether rendering succeeds or not.
    /// On error no surface is produced.
    pub fn process(&self, frame: RawFrame) -> Result<Surface> {
        let result = self.render(&frame);
        let sequence = frame.sequence;
        frame.release();

        match &result {
            Ok(surface) => trace!(
                sequence,
                width = surface.width(),
                height = surface.height(),
                "frame rendered"
            ),
            Err(e @ PipelineError::MalformedFrame { .. }) => {
                warn!(sequence, "dropping frame: {e}");
            }
            Err(e @ PipelineError::OutOfBounds { .. }) => {
                if cfg!(debug_assertions) {
                    panic!("decoder read past a validated buffer: {e}");
                }
                warn!(sequence, "dropping frame: {e}");
            }
        }
        result
    }

    fn render(&self, frame: &RawFrame) -> Result<Surface> {
        validate(frame)?;

        let width = frame.width as usize;
        let data = &frame.data()[..frame.expected_len()];
        let mut out = vec![PackedPixel::default(); frame.pixel_count()];

        match &self.pool {
            Some(pool) if frame.height > 1 => pool.install(|| {
                out.par_chunks_mut(width)
                    .zip(data.par_chunks(width * 4))
                    .try_for_each(|(dst, src)| self.render_row(src, dst))
            })?,
            _ => self.render_row(data, &mut out)?,
        }

        Surface::from_pixels(frame.width, frame.height, out).ok_or(PipelineError::MalformedFrame {
            width: frame.width,
            height: frame.height,
            expected: frame.expected_len(),
            actual: frame.data().len(),
        })
    }

    /// Render `dst.len()` pixels from `src`; one row or a whole frame.
    fn render_row(&self, src: &[u8], dst: &mut [PackedPixel]) -> Result<()> {
        for (i, out) in dst.iter_mut().enumerate() {
            *out = self.transform.apply(decode_at(src, i)?);
        }
        Ok(())
    }
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::inverting()
    }
}

/// Reject frames whose buffer cannot hold the declared dimensions.
fn validate(frame: &RawFrame) -> Result<()> {
    let expected = frame.expected_len();
    let actual = frame.data().len();
    if frame.width == 0 || frame.height == 0 || actual < expected {
        return Err(PipelineError::MalformedFrame {
            width: frame.width,
            height: frame.height,
            expected,
            actual,
        });
    }
    Ok(())
}
