use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, trace, warn};

use crate::diagnostics::stats::{DiagnosticSnapshot, DiagnosticStats};
use crate::display::{DisplaySink, PostOutcome, PresentationExecutor, TargetSize};
use crate::frame::RawFrame;
use crate::pipeline::FramePipeline;
use crate::scheduler::error::{Result, SchedulerError};
use crate::scheduler::state::SchedulerState;

const WORKER_THREAD_NAME: &str = "frame-worker";

/// State guarded by the scheduler lock: the lifecycle state and the single
/// pending-frame slot.
struct Slot {
    state: SchedulerState,
    pending: Option<RawFrame>,
    shutdown: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
    pipeline: FramePipeline,
    presenter: Arc<dyn PresentationExecutor>,
    sink: Arc<dyn DisplaySink>,
    target: TargetSize,
    stats: Arc<Mutex<DiagnosticStats>>,
}

/// Latest-wins scheduler between a capture source and the frame pipeline.
///
/// At most one frame is rendered at a time and at most one more waits in the
/// pending slot. A frame submitted while another is pending replaces it, and
/// the replaced frame is released without being rendered. Rendered surfaces
/// are posted to the presentation executor without waiting for them to be
/// shown.
pub struct FrameScheduler {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FrameScheduler {
    /// Create a stopped scheduler. Call [`FrameScheduler::start`] before
    /// submitting frames.
    pub fn new(
        pipeline: FramePipeline,
        presenter: Arc<dyn PresentationExecutor>,
        sink: Arc<dyn DisplaySink>,
        target: TargetSize,
    ) -> Self {
        Self::with_stats(
            pipeline,
            presenter,
            sink,
            target,
            Arc::new(Mutex::new(DiagnosticStats::new())),
        )
    }

    /// Create a stopped scheduler that records into existing stats.
    pub fn with_stats(
        pipeline: FramePipeline,
        presenter: Arc<dyn PresentationExecutor>,
        sink: Arc<dyn DisplaySink>,
        target: TargetSize,
        stats: Arc<Mutex<DiagnosticStats>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state: SchedulerState::Stopped,
                    pending: None,
                    shutdown: false,
                }),
                wake: Condvar::new(),
                pipeline,
                presenter,
                sink,
                target,
                stats,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the worker thread and begin accepting frames.
    pub fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.shared.slot.lock().shutdown = false;

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || shared.run_worker());

        match spawned {
            Ok(handle) => {
                // Frames are only accepted once a worker exists to take them
                self.shared.slot.lock().state = SchedulerState::Idle;
                *worker = Some(handle);
                info!(
                    transform = self.shared.pipeline.transform_name(),
                    workers = self.shared.pipeline.workers(),
                    "frame scheduler started"
                );
                Ok(())
            }
            Err(e) => Err(SchedulerError::Spawn(e)),
        }
    }

    /// Hand a captured frame to the scheduler. Never blocks on rendering and
    /// never fails; frames that cannot be queued are released immediately.
    pub fn submit(&self, frame: RawFrame) {
        let outcome = {
            let mut slot = self.shared.slot.lock();
            if slot.state.accepts_frames() {
                let replaced = slot.pending.replace(frame);
                self.shared.wake.notify_one();
                Ok(replaced)
            } else {
                Err((frame, slot.state))
            }
        };

        // Release outside the lock so a slow release hook cannot stall the worker
        match outcome {
            Ok(Some(replaced)) => {
                trace!(sequence = replaced.sequence, "pending frame superseded");
                self.shared.stats.lock().record_superseded();
                replaced.release();
            }
            Ok(None) => {}
            Err((frame, state)) => {
                debug!(sequence = frame.sequence, ?state, "scheduler not running, releasing frame");
                self.shared.stats.lock().record_rejected();
                frame.release();
            }
        }
    }

    /// Stop accepting frames and release the pending one. Blocks until the
    /// in-flight frame finishes and the worker exits.
    /// Idempotent.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return;
        };

        let pending = {
            let mut slot = self.shared.slot.lock();
            if slot.state != SchedulerState::Stopped {
                slot.state = SchedulerState::Draining;
            }
            slot.shutdown = true;
            self.shared.wake.notify_all();
            slot.pending.take()
        };
        self.shared.discard_pending(pending);

        if handle.join().is_err() {
            warn!("frame worker panicked");
        }
        self.shared.slot.lock().state = SchedulerState::Stopped;
        info!("frame scheduler stopped");
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.slot.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    /// Take a snapshot of the diagnostic counters.
    pub fn diagnostics(&self) -> DiagnosticSnapshot {
        self.shared.stats.lock().snapshot()
    }

    /// Shared handle to the stats this scheduler records into.
    pub fn stats(&self) -> Arc<Mutex<DiagnosticStats>> {
        Arc::clone(&self.shared.stats)
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn run_worker(&self) {
        info!("frame worker started");
        let _guard = WorkerGuard(self);
        while let Some(frame) = self.next_frame() {
            self.render(frame);
        }
        info!("frame worker exiting");
    }

    fn discard_pending(&self, pending: Option<RawFrame>) {
        if let Some(frame) = pending {
            debug!(sequence = frame.sequence, "discarding pending frame on shutdown");
            self.stats.lock().record_superseded();
            frame.release();
        }
    }

    /// Block until a frame is pending or shutdown is requested.
    fn next_frame(&self) -> Option<RawFrame> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(frame) = slot.pending.take() {
                slot.state = SchedulerState::Processing;
                return Some(frame);
            }
            if slot.shutdown {
                return None;
            }
            slot.state = SchedulerState::Idle;
            self.wake.wait(&mut slot);
        }
    }

    fn render(&self, frame: RawFrame) {
        let sequence = frame.sequence;
        let timestamp_us = frame.timestamp_us;
        let bytes = frame.expected_len();

        let surface = match self.pipeline.process(frame) {
            Ok(surface) => surface,
            Err(_) => {
                // Already logged by the pipeline; nothing is presented this cycle
                self.stats.lock().record_malformed();
                return;
            }
        };

        let sink = Arc::clone(&self.sink);
        let stats = Arc::clone(&self.stats);
        let target = self.target;
        let outcome = self.presenter.post(Box::new(move || {
            sink.present(surface, target);
            let mut stats = stats.lock();
            stats.record_presented(bytes, timestamp_us);
            if stats.presented_count() <= 3 {
                debug!(sequence, "frame #{} presented", stats.presented_count());
            }
        }));

        match outcome {
            PostOutcome::Queued => {}
            PostOutcome::Replaced => {
                trace!(sequence, "stale surface superseded before presentation");
                self.stats.lock().record_superseded();
            }
            PostOutcome::Rejected => self.stats.lock().record_present_skipped(),
        }
    }
}

/// Stops the scheduler accepting frames if the worker unwinds, so nothing
/// is left waiting for a thread that is gone.
struct WorkerGuard<'a>(&'a Shared);

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        error!("frame worker panicked, no further frames will be rendered");
        let pending = {
            let mut slot = self.0.slot.lock();
            slot.state = SchedulerState::Stopped;
            slot.pending.take()
        };
        self.0.discard_pending(pending);
    }
}
