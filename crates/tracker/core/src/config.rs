//! Polling loop configuration.

use std::time::Duration;

/// Settings of a [`ConfirmationWaiter`](crate::ConfirmationWaiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterConfig {
    /// Blocks, counting the inclusion block, a receipt must be buried under.
    pub required_confirmations: u64,
    /// Delay between attempts.
    pub poll_interval: Duration,
    /// Attempts made before giving up.
    pub max_attempts: u32,
}

impl WaiterConfig {
    /// Default number of confirmations.
    pub const DEFAULT_CONFIRMATIONS: u64 = 1;
    /// Default delay between attempts.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);
    /// Default attempt budget.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            required_confirmations: Self::DEFAULT_CONFIRMATIONS,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Settings of a [`ReactiveMonitor`](crate::ReactiveMonitor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Delay between ticks.
    pub poll_interval: Duration,
    /// Transactions requested per fetch.
    pub batch_size: u64,
    /// Sequence numbers below the head at start that are scanned as well.
    pub lookback: u64,
}

impl MonitorConfig {
    /// Default delay between ticks.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);
    /// Default batch size.
    pub const DEFAULT_BATCH_SIZE: u64 = 50;
    /// Default lookback window.
    pub const DEFAULT_LOOKBACK: u64 = 32;
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            lookback: Self::DEFAULT_LOOKBACK,
        }
    }
}
