// Display side: sinks and the presentation thread.

pub mod executor;
pub mod scale;
pub mod sink;

pub use executor::{PostOutcome, PresentJob, PresentationExecutor, PresentationThread};
pub use scale::ScalingSink;
pub use sink::{DisplaySink, TargetSize};
