use serde::Serialize;
use std::time::Instant;

/// Collects diagnostic statistics for a preview session.
///
/// Capture timestamps are interpreted as microseconds since
/// [`DiagnosticStats::started_at`], so sources that want meaningful latency
/// figures should stamp frames against that instant.
pub struct DiagnosticStats {
    presented_count: u64,
    superseded_count: u64,
    rejected_count: u64,
    malformed_count: u64,
    present_skipped_count: u64,
    total_bytes: u64,
    start_time: Instant,
    last_frame_time: Option<Instant>,
    latency_us: u64,
}

/// Snapshot of diagnostic stats for logging or serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSnapshot {
    pub fps: f64,
    pub presented_count: u64,
    pub superseded_count: u64,
    pub rejected_count: u64,
    pub malformed_count: u64,
    pub present_skipped_count: u64,
    pub drop_rate: f64,
    pub latency_ms: f64,
    pub throughput_bps: u64,
    pub idle_ms: Option<f64>,
}

impl DiagnosticStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            presented_count: 0,
            superseded_count: 0,
            rejected_count: 0,
            malformed_count: 0,
            present_skipped_count: 0,
            total_bytes: 0,
            start_time: Instant::now(),
            last_frame_time: None,
            latency_us: 0,
        }
    }

    /// Clock origin for capture timestamps.
    pub fn started_at(&self) -> Instant {
        self.start_time
    }

    /// Record a frame that was rendered and handed to the presenter.
    pub fn record_presented(&mut self, bytes: usize, capture_timestamp_us: u64) {
        self.presented_count += 1;
        self.total_bytes += bytes as u64;
        self.last_frame_time = Some(Instant::now());

        // Latency is time since the capture timestamp
        let now_us = self.start_time.elapsed().as_micros() as u64;
        if capture_timestamp_us <= now_us {
            self.latency_us = now_us - capture_timestamp_us;
        }
    }

    /// Record a pending frame that was replaced by a newer one.
    pub fn record_superseded(&mut self) {
        self.superseded_count += 1;
    }

    /// Record a frame submitted while the scheduler was not accepting work.
    pub fn record_rejected(&mut self) {
        self.rejected_count += 1;
    }

    /// Record a frame the pipeline refused to render.
    pub fn record_malformed(&mut self) {
        self.malformed_count += 1;
    }

    /// Record a rendered surface the presenter would not take.
    pub fn record_present_skipped(&mut self) {
        self.present_skipped_count += 1;
    }

    pub fn presented_count(&self) -> u64 {
        self.presented_count
    }

    /// Calculate presented frames per second since the stats started.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.presented_count as f64 / elapsed
    }

    /// Share of frames that were never presented, as a percentage (0.0 - 100.0).
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.superseded_count
            + self.rejected_count
            + self.malformed_count
            + self.present_skipped_count;
        let total = self.presented_count + dropped;
        if total == 0 {
            return 0.0;
        }
        (dropped as f64 / total as f64) * 100.0
    }

    /// Latest capture-to-presentation latency in milliseconds.
    pub fn latency_ms(&self) -> f64 {
        self.latency_us as f64 / 1000.0
    }

    /// Time since the last presented frame, if any.
    pub fn idle_ms(&self) -> Option<f64> {
        self.last_frame_time
            .map(|t| t.elapsed().as_secs_f64() * 1000.0)
    }

    /// Raw bytes rendered per second.
    pub fn throughput_bps(&self) -> u64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0;
        }
        (self.total_bytes as f64 / elapsed) as u64
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            fps: self.fps(),
            presented_count: self.presented_count,
            superseded_count: self.superseded_count,
            rejected_count: self.rejected_count,
            malformed_count: self.malformed_count,
            present_skipped_count: self.present_skipped_count,
            drop_rate: self.drop_rate(),
            latency_ms: self.latency_ms(),
            throughput_bps: self.throughput_bps(),
            idle_ms: self.idle_ms(),
        }
    }
}

impl Default for DiagnosticStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn initialises_with_zero_values() {
        let stats = DiagnosticStats::new();
        assert_eq!(stats.presented_count, 0);
        assert_eq!(stats.superseded_count, 0);
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.latency_us, 0);
    }

    #[test]
    fn record_presented_increments_count() {
        let mut stats = DiagnosticStats::new();
        stats.record_presented(1000, 0);
        assert_eq!(stats.presented_count(), 1);
        stats.record_presented(1000, 0);
        assert_eq!(stats.presented_count(), 2);
    }

    #[test]
    fn drop_counters_are_independent() {
        let mut stats = DiagnosticStats::new();
        stats.record_superseded();
        stats.record_superseded();
        stats.record_rejected();
        stats.record_malformed();
        stats.record_present_skipped();
        let snap = stats.snapshot();
        assert_eq!(snap.superseded_count, 2);
        assert_eq!(snap.rejected_count, 1);
        assert_eq!(snap.malformed_count, 1);
        assert_eq!(snap.present_skipped_count, 1);
    }

    #[test]
    fn fps_is_positive_after_frames() {
        let mut stats = DiagnosticStats::new();
        for i in 0..30 {
            stats.record_presented(1000, i * 3333);
        }
        thread::sleep(Duration::from_millis(100));
        let fps = stats.fps();
        assert!(fps > 0.0, "fps should be positive, got {fps}");
    }

    #[test]
    fn drop_rate_returns_percentage() {
        let mut stats = DiagnosticStats::new();
        stats.record_presented(1000, 0);
        stats.record_presented(1000, 0);
        stats.record_superseded();
        // 1 drop out of 3 total = 33.3%
        let rate = stats.drop_rate();
        assert!(
            (rate - 33.333).abs() < 1.0,
            "drop rate should be ~33%, got {rate}"
        );
    }

    #[test]
    fn drop_rate_zero_when_no_events() {
        let stats = DiagnosticStats::new();
        assert_eq!(stats.drop_rate(), 0.0);
    }

    #[test]
    fn latency_measured_against_start_time() {
        let mut stats = DiagnosticStats::new();
        thread::sleep(Duration::from_millis(20));
        stats.record_presented(4, 0);
        assert!(stats.latency_ms() >= 20.0, "got {}", stats.latency_ms());
    }

    #[test]
    fn future_timestamp_leaves_latency_unchanged() {
        let mut stats = DiagnosticStats::new();
        stats.record_presented(4, u64::MAX);
        assert_eq!(stats.latency_ms(), 0.0);
    }

    #[test]
    fn throughput_tracks_bytes() {
        let mut stats = DiagnosticStats::new();
        stats.record_presented(10_000, 0);
        thread::sleep(Duration::from_millis(50));
        let bps = stats.throughput_bps();
        assert!(bps > 0, "throughput should be positive, got {bps}");
    }

    #[test]
    fn reset_clears_all_counters() {
        let mut stats = DiagnosticStats::new();
        stats.record_presented(1000, 0);
        stats.record_superseded();
        stats.record_malformed();
        stats.reset();
        assert_eq!(stats.presented_count, 0);
        assert_eq!(stats.superseded_count, 0);
        assert_eq!(stats.malformed_count, 0);
        assert_eq!(stats.total_bytes, 0);
        assert!(stats.last_frame_time.is_none());
    }

    #[test]
    fn idle_is_none_until_first_frame() {
        let mut stats = DiagnosticStats::new();
        assert!(stats.idle_ms().is_none());
        stats.record_presented(4, 0);
        assert!(stats.idle_ms().is_some());
    }

    #[test]
    fn snapshot_serialises_to_camelcase() {
        let mut stats = DiagnosticStats::new();
        stats.record_presented(5000, 0);
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert!(json["presentedCount"].is_number());
        assert!(json["supersededCount"].is_number());
        assert!(json["dropRate"].is_number());
        assert!(json["throughputBps"].is_number());
        assert!(json["idleMs"].is_number());
    }
}
