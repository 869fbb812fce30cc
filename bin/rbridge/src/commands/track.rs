//! Track Subcommand

use crate::{
    commands::{unix_now, wait::describe_outcome},
    flags::{GlobalArgs, MonitorArgs, WaiterArgs},
};
use alloy_primitives::{B256, ChainId};
use clap::Parser;
use rbridge_settlement::{ChainRef, ChainRegistry, EventStatus, SettlementTimeline, steps};
use rbridge_tracker_core::{
    ConfirmationWaiter, Correlation, ReactiveMonitor, Subscription, TimelineRecorder,
};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The `track` Subcommand
///
/// Follows an order deposit from the origin chain to its relay on the coordinating ledger
/// and prints the settlement timeline.
///
/// # Usage
///
/// ```sh
/// rbridge track --chain-id 11155111 --tx-hash 0x... --destination-chain-id 84532
/// ```
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Tracks a deposit through its coordinating ledger relay")]
pub struct TrackCommand {
    /// Origin chain of the deposit.
    #[arg(long = "chain-id", short = 'c')]
    pub chain_id: ChainId,
    /// Deposit transaction hash.
    #[arg(long = "tx-hash")]
    pub tx_hash: B256,
    /// Chain the order settles on.
    #[arg(long = "destination-chain-id", short = 'd')]
    pub destination_chain_id: ChainId,
    /// Execution environment to follow. Defaults to the registry's.
    #[arg(long = "rvm-id", env = "RBRIDGE_RVM_ID")]
    pub rvm_id: Option<String>,
    /// How long to follow the coordinating ledger once the deposit is confirmed, in seconds.
    #[arg(long = "relay-timeout-secs", default_value_t = 600)]
    pub relay_timeout_secs: u64,
    /// Ignore relays executed before this unix time. Defaults to when tracking starts.
    #[arg(long = "start-timestamp")]
    pub start_timestamp: Option<u64>,
    /// Waiter flags.
    #[command(flatten)]
    pub waiter: WaiterArgs,
    /// Monitor flags.
    #[command(flatten)]
    pub monitor: MonitorArgs,
}

impl TrackCommand {
    /// Runs the subcommand.
    pub async fn run(
        self,
        args: &GlobalArgs,
        cancellation: CancellationToken,
    ) -> anyhow::Result<()> {
        let started_at = unix_now()?;
        let registry = args.registry()?;
        let recorder = TimelineRecorder::standard(self.chain_id, self.destination_chain_id);

        let waiter = ConfirmationWaiter::new(
            Arc::new(args.origin_reader(&registry)?),
            self.waiter.config(),
        )
        .with_cancellation(cancellation.clone());
        let outcome = waiter.wait_for(self.chain_id, self.tx_hash).await?;
        info!(target: "rbridge", "{}", describe_outcome(&registry, self.chain_id, &outcome));
        recorder.record_confirmation(steps::ORDER_PLACED, self.tx_hash, &outcome, unix_now()?)?;

        if outcome.is_confirmed() {
            let rvm_id = args.rvm_id(&registry, self.rvm_id.clone())?;
            let subscription = Subscription::new(
                rvm_id,
                self.start_timestamp.unwrap_or(started_at),
                Correlation::origin(self.chain_id, self.tx_hash).into_predicate(),
                recorder.relay_callback(steps::REACTIVE_PROCESSING),
            );
            let reader = Arc::new(args.reactive_reader(&registry)?);
            let mut monitor = ReactiveMonitor::new(reader, self.monitor.config())
                .with_cancellation(cancellation.clone());
            monitor.start(subscription)?;

            let mut cursor = monitor.watch_cursor();
            let deadline = tokio::time::sleep(Duration::from_secs(self.relay_timeout_secs));
            tokio::pin!(deadline);
            while relay_pending(&recorder.snapshot()) {
                tokio::select! {
                    _ = cancellation.cancelled() => break,
                    _ = &mut deadline => {
                        info!(target: "rbridge", "Gave up waiting for the relay");
                        break;
                    }
                    changed = cursor.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            monitor.shutdown().await;
        }

        print_timeline(&registry, &recorder.snapshot());
        Ok(())
    }
}

fn relay_pending(timeline: &SettlementTimeline) -> bool {
    timeline
        .get(steps::REACTIVE_PROCESSING)
        .is_some_and(|event| event.status == EventStatus::Pending)
}

fn print_timeline(registry: &ChainRegistry, timeline: &SettlementTimeline) {
    for event in timeline.events() {
        let ledger = match event.chain {
            ChainRef::Chain(chain_id) => registry.chain_name(chain_id),
            ChainRef::Reactive(_) => registry.reactive().name.clone(),
        };
        let tx = event.tx_hash.map(|hash| hash.to_string()).unwrap_or_default();
        let status = event.status.to_string();
        println!("{}. {:<20} {ledger:<18} {status:<9} {tx}", event.step, event.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_timestamp_is_optional() {
        let hash = B256::repeat_byte(0x42).to_string();
        let base = ["track", "-c", "11155111", "-d", "84532", "--tx-hash", hash.as_str()];
        assert_eq!(TrackCommand::parse_from(base).start_timestamp, None);

        let argv = base.iter().copied().chain(["--start-timestamp", "1700000000"]);
        assert_eq!(TrackCommand::parse_from(argv).start_timestamp, Some(1_700_000_000));
    }

    #[test]
    fn test_relay_pending() {
        let mut timeline = SettlementTimeline::standard(11155111, 84532);
        assert!(relay_pending(&timeline));

        timeline
            .resolve(
                steps::REACTIVE_PROCESSING,
                rbridge_settlement::Resolution {
                    tx_hash: B256::ZERO,
                    timestamp: 1,
                    success: true,
                    gas_used: None,
                },
            )
            .unwrap();
        assert!(!relay_pending(&timeline));
    }
}
