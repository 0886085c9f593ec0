use serde::Serialize;

/// Lifecycle of the frame scheduler.
///
/// `Stopped` is both the state before `start()` and the terminal state after
/// `stop()` has drained the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchedulerState {
    Stopped,
    /// Running, no frame in flight.
    Idle,
    /// A frame is being rendered; a newer one may be pending.
    Processing,
    /// Shutdown requested; the in-flight frame is finishing.
    Draining,
}

impl SchedulerState {
    /// Whether `submit` queues frames in this state.
    pub fn accepts_frames(self) -> bool {
        matches!(self, Self::Idle | Self::Processing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_running_states_accept_frames() {
        assert!(SchedulerState::Idle.accepts_frames());
        assert!(SchedulerState::Processing.accepts_frames());
        assert!(!SchedulerState::Stopped.accepts_frames());
        assert!(!SchedulerState::Draining.accepts_frames());
    }

    #[test]
    fn serialises_to_camelcase() {
        let json = serde_json::to_value(SchedulerState::Processing).unwrap();
        assert_eq!(json, "processing");
    }
}
