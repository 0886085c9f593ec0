// Frame scheduling: latest-wins hand-off from the capture source to the pipeline.

pub mod error;
pub mod frame_scheduler;
pub mod state;

pub use error::SchedulerError;
pub use frame_scheduler::FrameScheduler;
pub use state::SchedulerState;
