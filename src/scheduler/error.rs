use thiserror::Error;

/// Scheduler lifecycle errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,

    #[error("failed to spawn frame worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, SchedulerError>;
