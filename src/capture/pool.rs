use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::frame::ReleaseHook;

/// Recycles frame buffers between the capture source and the pipeline.
///
/// Frames carrying [`BufferPool::release_hook`] hand their buffer back on
/// release. When the frame is released the
/// buffer comes back here instead of being freed. At most `max_free` idle
/// buffers are retained; extras are dropped.
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    max_free: usize,
    allocated: AtomicUsize,
}

impl BufferPool {
    /// Create a pool that keeps up to `max_free` idle buffers.
    pub fn new(max_free: usize) -> Arc<Self> {
        Arc::new(Self {
            free: Mutex::new(Vec::with_capacity(max_free)),
            max_free,
            allocated: AtomicUsize::new(0),
        })
    }

    /// Take a zero-filled buffer of exactly `len` bytes, reusing an idle one
    /// when available.
    pub fn acquire(&self, len: usize) -> Vec<u8> {
        let reused = self.free.lock().pop();
        match reused {
            Some(mut buf) => {
                buf.clear();
                buf.resize(len, 0);
                buf
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                vec![0; len]
            }
        }
    }

    /// Return a buffer to the pool.
    pub fn recycle(&self, buf: Vec<u8>) {
        let mut free = self.free.lock();
        if free.len() < self.max_free {
            free.push(buf);
        }
    }

    /// Release hook that recycles the frame's buffer into this pool.
    pub fn release_hook(self: &Arc<Self>) -> ReleaseHook {
        let pool = Arc::clone(self);
        Box::new(move |buf| pool.recycle(buf))
    }

    /// Idle buffers currently held.
    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }

    /// Buffers allocated fresh since the pool was created.
    pub fn allocated_count(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}
