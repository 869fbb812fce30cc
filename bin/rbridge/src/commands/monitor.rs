//! Monitor Subcommand

use crate::{
    commands::unix_now,
    flags::{GlobalArgs, MonitorArgs},
};
use alloy_primitives::{Address, B256, ChainId};
use clap::Parser;
use rbridge_tracker_core::{Correlation, ReactiveMonitor, Subscription};
use rbridge_types::ReactiveTransaction;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The `monitor` Subcommand
///
/// Follows the coordinating ledger and prints every matching transaction as a JSON line
/// until interrupted.
///
/// # Usage
///
/// ```sh
/// rbridge monitor [--rvm-id 0x...] [--origin-chain-id 11155111 --origin-tx 0x...]
/// ```
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Follows the coordinating ledger for matching transactions")]
pub struct MonitorCommand {
    /// Execution environment to follow. Defaults to the registry's.
    #[arg(long = "rvm-id", env = "RBRIDGE_RVM_ID")]
    pub rvm_id: Option<String>,
    /// Only match transactions sent to this address.
    #[arg(long = "recipient")]
    pub recipient: Option<Address>,
    /// Only match relays of events from this chain.
    #[arg(long = "origin-chain-id")]
    pub origin_chain_id: Option<ChainId>,
    /// Only match relays of this origin transaction.
    #[arg(long = "origin-tx")]
    pub origin_tx: Option<B256>,
    /// Ignore transactions executed before this unix time. Defaults to now.
    #[arg(long = "start-timestamp")]
    pub start_timestamp: Option<u64>,
    /// Monitor flags.
    #[command(flatten)]
    pub monitor: MonitorArgs,
}

impl MonitorCommand {
    /// The predicate built from the filter flags.
    pub const fn correlation(&self) -> Correlation {
        Correlation {
            recipient: self.recipient,
            origin_chain_id: self.origin_chain_id,
            origin_tx_hash: self.origin_tx,
        }
    }

    /// The subscription for `rvm_id`, skipping anything executed before `now` unless
    /// `--start-timestamp` says otherwise.
    pub fn subscription(
        &self,
        rvm_id: String,
        now: u64,
        on_match: impl Fn(&ReactiveTransaction) + Send + Sync + 'static,
    ) -> Subscription {
        Subscription::new(
            rvm_id,
            self.start_timestamp.unwrap_or(now),
            self.correlation().into_predicate(),
            on_match,
        )
    }

    /// Runs the subcommand until `cancellation` fires.
    pub async fn run(
        self,
        args: &GlobalArgs,
        cancellation: CancellationToken,
    ) -> anyhow::Result<()> {
        let registry = args.registry()?;
        let reader = Arc::new(args.reactive_reader(&registry)?);
        let rvm_id = args.rvm_id(&registry, self.rvm_id.clone())?;

        let subscription = self.subscription(rvm_id.clone(), unix_now()?, print_transaction);
        let mut monitor = ReactiveMonitor::new(reader, self.monitor.config())
            .with_cancellation(cancellation.clone());
        monitor.start(subscription)?;
        info!(target: "rbridge", %rvm_id, correlation = ?self.correlation(), "Monitoring");

        cancellation.cancelled().await;
        monitor.shutdown().await;
        Ok(())
    }
}

fn print_transaction(tx: &ReactiveTransaction) {
    match serde_json::to_string(tx) {
        Ok(line) => println!("{line}"),
        Err(err) => warn!(target: "rbridge", hash = %tx.hash, %err, "Failed to encode transaction"),
    }
}
