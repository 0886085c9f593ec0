// Frame pipeline: turns a raw frame into a display surface.

pub mod error;
pub mod process;

pub use error::PipelineError;
pub use process::FramePipeline;
