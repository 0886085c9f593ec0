use thiserror::Error;

/// Per-frame processing errors. None of these stop the pipeline; the
/// offending frame is released and the next one is processed normally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("malformed frame {width}x{height}: expected at least {expected} bytes, got {actual}")]
    MalformedFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("pixel {index} out of bounds for buffer of {len} bytes")]
    OutOfBounds { index: usize, len: usize },
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;
