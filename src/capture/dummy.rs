use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::capture::pool::BufferPool;
use crate::frame::RawFrame;

/// Callback through which a capture source pushes frames.
pub type FrameCallback = Arc<dyn Fn(RawFrame) + Send + Sync>;

const POOL_DEPTH: usize = 3;

/// Settings for the simulated camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummySourceConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for DummySourceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

/// Simulated camera that emits a moving RGBA test pattern on its own thread.
///
/// Enable via `DUMMY_CAMERA=1` environment variable, or start it directly.
/// Frame buffers come from a small [`BufferPool`] and return to it when the
/// pipeline releases them.
pub struct DummySource {
    running: Arc<AtomicBool>,
    emitted: Arc<AtomicU64>,
    pool: Arc<BufferPool>,
    thread: Option<JoinHandle<()>>,
}

impl DummySource {
    /// Check whether the dummy source is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("DUMMY_CAMERA").is_ok_and(|v| v == "1" || v == "true")
    }

    /// Start emitting frames to `deliver`.
    ///
    /// Timestamps are microseconds since `epoch`.
    pub fn start(
        config: DummySourceConfig,
        epoch: Instant,
        deliver: FrameCallback,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let emitted = Arc::new(AtomicU64::new(0));
        let pool = BufferPool::new(POOL_DEPTH);

        let thread = {
            let running = Arc::clone(&running);
            let emitted = Arc::clone(&emitted);
            let pool = Arc::clone(&pool);
            std::thread::Builder::new()
                .name("dummy-capture".to_string())
                .spawn(move || {
                    info!(
                        "dummy capture starting at {}x{} @ {} fps",
                        config.width, config.height, config.fps
                    );
                    run_capture_loop(config, epoch, &running, &emitted, &pool, &deliver);
                    info!("dummy capture exiting");
                })?
        };

        Ok(Self {
            running,
            emitted,
            pool,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Frames handed to the callback so far.
    pub fn frames_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Stop the capture thread. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("dummy capture thread panicked");
            }
        }
    }
}

impl Drop for DummySource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_capture_loop(
    config: DummySourceConfig,
    epoch: Instant,
    running: &AtomicBool,
    emitted: &AtomicU64,
    pool: &Arc<BufferPool>,
    deliver: &FrameCallback,
) {
    let interval = Duration::from_secs(1) / config.fps.max(1);
    let len = config.width as usize * config.height as usize * 4;
    let mut next_due = Instant::now();
    let mut sequence = 0u64;

    while running.load(Ordering::Relaxed) {
        let mut data = pool.acquire(len);
        fill_test_pattern(&mut data, config.width, config.height, sequence);

        let timestamp_us = epoch.elapsed().as_micros() as u64;
        let frame = RawFrame::new(config.width, config.height, data)
            .with_timestamp(timestamp_us)
            .with_sequence(sequence)
            .with_release(pool.release_hook());
        deliver(frame);

        let count = emitted.fetch_add(1, Ordering::Relaxed) + 1;
        if count <= 3 {
            debug!("dummy frame #{count} delivered: {}x{}", config.width, config.height);
        }
        sequence += 1;

        next_due += interval;
        let now = Instant::now();
        if next_due > now {
            std::thread::park_timeout(next_due - now);
        } else {
            // Fell behind; resynchronise instead of bursting
            next_due = now;
        }
    }
}

/// Fill `data` with a diagonal gradient that scrolls by one pixel per frame.
pub fn fill_test_pattern(data: &mut [u8], width: u32, height: u32, frame_index: u64) {
    let width = width as usize;
    let shift = frame_index as usize;
    for (i, px) in data.chunks_exact_mut(4).take(width * height as usize).enumerate() {
        let x = i % width.max(1);
        let y = i / width.max(1);
        px[0] = ((x + shift) % 256) as u8; // R
        px[1] = (y % 256) as u8; // G
        px[2] = ((x + y) % 256) as u8; // B
        px[3] = 255; // A
    }
}
