//! Camera preview core: captured RGBA frames are decoded, colour-inverted and
//! handed to a display sink on a dedicated presentation thread, with a
//! latest-wins scheduler in between so a slow display never backs up capture.

pub mod capture;
pub mod diagnostics;
pub mod display;
pub mod filter;
pub mod frame;
pub mod pipeline;
pub mod scheduler;
pub mod session;
pub mod settings;

pub use capture::{DummySource, Permission, PermissionProvider, StaticPermissions};
pub use diagnostics::DiagnosticSnapshot;
pub use display::{
    DisplaySink, PostOutcome, PresentationExecutor, PresentationThread, ScalingSink, TargetSize,
};
pub use filter::{invert_channel, ColorTransform, Invert};
pub use frame::{PackedPixel, Pixel, PixelFormat, RawFrame, Surface};
pub use pipeline::{FramePipeline, PipelineError};
pub use scheduler::{FrameScheduler, SchedulerError, SchedulerState};
pub use session::{PreviewSession, SessionError};
pub use settings::{PreviewSettings, SettingsError, SettingsStore};
