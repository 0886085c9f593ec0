use std::thread::{JoinHandle, ThreadId};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// A unit of presentation work, run on the presentation thread.
pub type PresentJob = Box<dyn FnOnce() + Send>;

/// Jobs waiting behind the one being run. A newer job replaces a waiting one.
pub const PRESENT_QUEUE_DEPTH: usize = 1;

/// What happened to a job handed to [`PresentationExecutor::post`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// Queued behind nothing stale.
    Queued,
    /// Queued, and an older job that had not started yet was dropped for it.
    Replaced,
    /// Not accepted because the executor is shut down. The job was dropped.
    Rejected,
}

impl PostOutcome {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Runs jobs on the single thread that owns the display.
///
/// `post` hands the job over and returns immediately. Only the latest job
/// waits; one that has not started when a newer one arrives is dropped
/// along with everything it captured.
pub trait PresentationExecutor: Send + Sync {
    fn post(&self, job: PresentJob) -> PostOutcome;
}

struct Queue {
    sender: Sender<PresentJob>,
    // Lets `post` take back a job that is still waiting
    stale: Receiver<PresentJob>,
}

/// Dedicated presentation thread fed through a one-slot channel.
pub struct PresentationThread {
    queue: Mutex<Option<Queue>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl PresentationThread {
    /// Spawn the presentation thread.
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded::<PresentJob>(PRESENT_QUEUE_DEPTH);
        let stale = receiver.clone();
        let thread_name = name.to_string();
        let handle = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                info!("presentation thread {thread_name} started");
                for job in receiver {
                    job();
                }
                info!("presentation thread {thread_name} exiting");
            })?;
        let thread_id = handle.thread().id();

        Ok(Self {
            queue: Mutex::new(Some(Queue { sender, stale })),
            thread: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    /// True when called from the presentation thread itself.
    pub fn is_presentation_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Stop accepting jobs and join the thread once the queue drains.
    /// Idempotent.
    pub fn shutdown(&self) {
        drop(self.queue.lock().take());
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == std::thread::current().id() {
                // A job cannot join its own thread; it exits once the queue drains
                return;
            }
            if handle.join().is_err() {
                warn!("presentation thread panicked");
            }
        }
    }
}

impl PresentationExecutor for PresentationThread {
    fn post(&self, job: PresentJob) -> PostOutcome {
        // Held across the whole post so only one producer touches the slot
        let queue = self.queue.lock();
        let Some(queue) = queue.as_ref() else {
            debug!("presentation thread shut down, dropping job");
            return PostOutcome::Rejected;
        };

        let job = match queue.sender.try_send(job) {
            Ok(()) => return PostOutcome::Queued,
            Err(TrySendError::Full(job)) => job,
            Err(TrySendError::Disconnected(_)) => {
                warn!("presentation thread is gone, dropping job");
                return PostOutcome::Rejected;
            }
        };

        // The waiting job may have started in the meantime; then nothing is replaced
        let replaced = queue.stale.try_recv().is_ok();
        match queue.sender.try_send(job) {
            Ok(()) if replaced => {
                debug!("replacing stale presentation job");
                PostOutcome::Replaced
            }
            Ok(()) => PostOutcome::Queued,
            Err(_) => {
                warn!("presentation slot still occupied, dropping job");
                PostOutcome::Rejected
            }
        }
    }
}

impl Drop for PresentationThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
