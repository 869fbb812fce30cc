//! Polling loop flags.

use clap::Parser;
use rbridge_tracker_core::{MonitorConfig, WaiterConfig};
use std::time::Duration;

/// Confirmation waiter flags.
#[derive(Parser, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterArgs {
    /// Blocks, counting the inclusion block, the transaction must be buried under.
    #[arg(long = "confirmations", default_value_t = WaiterConfig::DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,
    /// Delay between receipt polls, in milliseconds.
    #[arg(
        id = "waiter.poll_interval_ms",
        long = "waiter.poll-interval-ms",
        default_value_t = WaiterConfig::DEFAULT_POLL_INTERVAL.as_millis() as u64
    )]
    pub poll_interval_ms: u64,
    /// Receipt polls before giving up.
    #[arg(long = "max-attempts", default_value_t = WaiterConfig::DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl WaiterArgs {
    /// The waiter configuration.
    pub const fn config(&self) -> WaiterConfig {
        WaiterConfig {
            required_confirmations: self.confirmations,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// Coordinating ledger monitor flags.
#[derive(Parser, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorArgs {
    /// Transactions requested per fetch.
    #[arg(long = "batch-size", default_value_t = MonitorConfig::DEFAULT_BATCH_SIZE)]
    pub batch_size: u64,
    /// Sequence numbers below the head at start that are scanned as well.
    #[arg(long = "lookback", default_value_t = MonitorConfig::DEFAULT_LOOKBACK)]
    pub lookback: u64,
    /// Delay between monitor ticks, in milliseconds.
    #[arg(
        id = "monitor.poll_interval_ms",
        long = "monitor.poll-interval-ms",
        default_value_t = MonitorConfig::DEFAULT_POLL_INTERVAL.as_millis() as u64
    )]
    pub poll_interval_ms: u64,
}

impl MonitorArgs {
    /// The monitor configuration.
    pub const fn config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            batch_size: self.batch_size,
            lookback: self.lookback,
        }
    }
}

impl Default for WaiterArgs {
    fn default() -> Self {
        let config = WaiterConfig::default();
        Self {
            confirmations: config.required_confirmations,
            poll_interval_ms: config.poll_interval.as_millis() as u64,
            max_attempts: config.max_attempts,
        }
    }
}

impl Default for MonitorArgs {
    fn default() -> Self {
        let config = MonitorConfig::default();
        Self {
            batch_size: config.batch_size,
            lookback: config.lookback,
            poll_interval_ms: config.poll_interval.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct MockCommand {
        #[clap(flatten)]
        waiter: WaiterArgs,
        #[clap(flatten)]
        monitor: MonitorArgs,
    }

    #[test]
    fn test_defaults_match_configs() {
        let args = MockCommand::parse_from(["test"]);
        assert_eq!(args.waiter.config(), WaiterConfig::default());
        assert_eq!(args.monitor.config(), MonitorConfig::default());
    }

    #[test]
    fn test_overrides() {
        let args = MockCommand::parse_from([
            "test",
            "--confirmations",
            "3",
            "--waiter.poll-interval-ms",
            "500",
            "--max-attempts",
            "10",
            "--batch-size",
            "8",
            "--lookback",
            "0",
        ]);
        assert_eq!(
            args.waiter.config(),
            WaiterConfig {
                required_confirmations: 3,
                poll_interval: Duration::from_millis(500),
                max_attempts: 10,
            }
        );
        assert_eq!(args.monitor.config().batch_size, 8);
        assert_eq!(args.monitor.config().lookback, 0);
    }
}
