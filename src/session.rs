use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::capture::{
    missing_permissions, DummySource, FrameCallback, Permission, PermissionProvider,
};
use crate::diagnostics::{DiagnosticSnapshot, DiagnosticStats};
use crate::display::{DisplaySink, PresentationThread, ScalingSink, TargetSize};
use crate::filter::{ColorTransform, Invert};
use crate::frame::{RawFrame, Surface};
use crate::pipeline::FramePipeline;
use crate::scheduler::{FrameScheduler, SchedulerError, SchedulerState};
use crate::settings::{PreviewSettings, SettingsError, SettingsStore};

const PRESENT_THREAD_NAME: &str = "preview-present";

/// Errors raised while bringing a preview session up.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("required permissions not granted: {0:?}")]
    PermissionDenied(Vec<Permission>),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("failed to spawn presentation thread: {0}")]
    Presenter(std::io::Error),

    #[error("failed to start dummy source: {0}")]
    Source(std::io::Error),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// A running camera preview, optionally fed by the simulated camera.
///
/// Dropping the session stops everything in reverse order.
pub struct PreviewSession {
    scheduler: Arc<FrameScheduler>,
    presenter: Arc<PresentationThread>,
    source: Mutex<Option<DummySource>>,
    target: TargetSize,
}

impl PreviewSession {
    /// Start a preview that inverts every frame.
    pub fn start(
        settings: &PreviewSettings,
        permissions: &dyn PermissionProvider,
        sink: Arc<dyn DisplaySink>,
    ) -> Result<Self> {
        Self::start_with_transform(settings, permissions, sink, Arc::new(Invert))
    }

    /// Start a preview with a custom per-pixel transform.
    pub fn start_with_transform(
        settings: &PreviewSettings,
        permissions: &dyn PermissionProvider,
        sink: Arc<dyn DisplaySink>,
        transform: Arc<dyn ColorTransform>,
    ) -> Result<Self> {
        let missing = missing_permissions(permissions);
        if !missing.is_empty() {
            warn!("preview refused, missing permissions: {missing:?}");
            return Err(SessionError::PermissionDenied(missing));
        }

        let presenter = Arc::new(
            PresentationThread::spawn(PRESENT_THREAD_NAME).map_err(SessionError::Presenter)?,
        );

        let sink: Arc<dyn DisplaySink> = if settings.scale_to_target {
            Arc::new(ScalingSink::new(
                move |surface: Surface, target: TargetSize| sink.present(surface, target),
            ))
        } else {
            sink
        };

        let target = settings.target();
        let pipeline = FramePipeline::new(transform).with_workers(settings.workers);
        let stats = Arc::new(Mutex::new(DiagnosticStats::new()));
        let epoch = stats.lock().started_at();
        let scheduler = Arc::new(FrameScheduler::with_stats(
            pipeline,
            presenter.clone(),
            sink,
            target,
            stats,
        ));
        scheduler.start()?;

        let session = Self {
            scheduler,
            presenter,
            source: Mutex::new(None),
            target,
        };

        if settings.use_dummy_source || DummySource::is_enabled() {
            let source =
                DummySource::start(settings.dummy_config(), epoch, session.frame_callback())
                    .map_err(SessionError::Source)?;
            *session.source.lock() = Some(source);
        }

        info!(
            "preview session started: {}x{} target, {} worker(s)",
            target.width, target.height, settings.workers
        );
        Ok(session)
    }

    /// Load settings from `path` and start an inverting preview with them.
    pub fn start_from_file(
        path: &Path,
        permissions: &dyn PermissionProvider,
        sink: Arc<dyn DisplaySink>,
    ) -> Result<Self> {
        let settings = SettingsStore::load(path)?;
        Self::start(&settings, permissions, sink)
    }

    /// Callback a capture source can push frames through.
    pub fn frame_callback(&self) -> FrameCallback {
        let scheduler = Arc::clone(&self.scheduler);
        Arc::new(move |frame| scheduler.submit(frame))
    }

    /// Hand a captured frame to the scheduler.
    pub fn submit(&self, frame: RawFrame) {
        self.scheduler.submit(frame);
    }

    /// Stop the dummy source, drain the scheduler, then shut the presentation
    /// thread down. Idempotent.
    pub fn stop(&self) {
        if let Some(mut source) = self.source.lock().take() {
            source.stop();
        }
        if self.scheduler.is_running() {
            self.scheduler.stop();
            info!("preview session stopped");
        }
        self.presenter.shutdown();
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn target(&self) -> TargetSize {
        self.target
    }

    pub fn has_dummy_source(&self) -> bool {
        self.source.lock().is_some()
    }

    pub fn diagnostics(&self) -> DiagnosticSnapshot {
        self.scheduler.diagnostics()
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        self.stop();
    }
}
