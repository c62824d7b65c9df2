use std::time::Duration;

/// Timing knobs for a challenger.
#[derive(Debug, Clone)]
pub struct ChallengerConfig {
    /// Fixed interval between settlement-state polls. Kept short (well
    /// under a second) so worst-case verification latency stays low; no
    /// backoff, since the expected wait is bounded.
    pub poll_interval: Duration,
    /// Interval between backend liveness checks in the monitor task.
    pub monitor_interval: Duration,
    /// How long `stop()` waits for the monitor task to exit before
    /// aborting it.
    pub stop_grace: Duration,
}

impl Default for ChallengerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            monitor_interval: Duration::from_secs(5),
            stop_grace: Duration::from_secs(2),
        }
    }
}
