// Diagnostics: frame counters and timing for a preview session.

pub mod stats;

pub use stats::{DiagnosticSnapshot, DiagnosticStats};
