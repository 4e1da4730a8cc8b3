//! Session manager configuration.

use std::time::Duration;

use live_response_core::SensorId;

/// Policy applied when a keep-alive call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepAliveFailure {
    /// Mark the session terminated and exit the worker on the first failure.
    Stop,
    /// Tolerate up to `attempts` consecutive failures, one interval apart,
    /// before terminating.
    Retry { attempts: u32 },
}

/// Configuration for a [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target sensor to open the session against.
    pub sensor_id: SensorId,
    /// Backoff between establishment status polls.
    pub poll_interval: Duration,
    /// Interval between keep-alive calls once established.
    pub keep_alive_interval: Duration,
    /// Optional cap on how long command calls wait for readiness.
    /// `None` waits indefinitely.
    pub ready_timeout: Option<Duration>,
    /// What to do when a keep-alive call fails.
    pub keep_alive_failure: KeepAliveFailure,
}

impl SessionConfig {
    /// Create a configuration with the default intervals.
    #[must_use]
    pub const fn new(sensor_id: SensorId) -> Self {
        Self {
            sensor_id,
            poll_interval: Duration::from_secs(5),
            keep_alive_interval: Duration::from_secs(60),
            ready_timeout: None,
            keep_alive_failure: KeepAliveFailure::Stop,
        }
    }

    /// Override the establishment poll interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the keep-alive interval.
    #[must_use]
    pub const fn keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Bound how long command calls wait for the session to become usable.
    #[must_use]
    pub const fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Override the keep-alive failure policy.
    #[must_use]
    pub const fn keep_alive_failure(mut self, policy: KeepAliveFailure) -> Self {
        self.keep_alive_failure = policy;
        self
    }
}
