//! Wait Subcommand

use crate::flags::{GlobalArgs, WaiterArgs};
use alloy_primitives::{B256, ChainId};
use clap::Parser;
use rbridge_settlement::ChainRegistry;
use rbridge_tracker_core::{ConfirmationOutcome, ConfirmationWaiter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The `wait` Subcommand
///
/// Polls a chain until the given transaction is mined, then prints the verdict.
///
/// # Usage
///
/// ```sh
/// rbridge wait --chain-id 11155111 --tx-hash 0x... [--confirmations 3]
/// ```
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Waits for a transaction to be confirmed")]
pub struct WaitCommand {
    /// Chain the transaction was submitted on.
    #[arg(long = "chain-id", short = 'c')]
    pub chain_id: ChainId,
    /// Transaction hash.
    #[arg(long = "tx-hash")]
    pub tx_hash: B256,
    /// Waiter flags.
    #[command(flatten)]
    pub waiter: WaiterArgs,
}

impl WaitCommand {
    /// Runs the subcommand.
    pub async fn run(
        self,
        args: &GlobalArgs,
        cancellation: CancellationToken,
    ) -> anyhow::Result<()> {
        let registry = args.registry()?;
        let reader = Arc::new(args.origin_reader(&registry)?);
        let waiter =
            ConfirmationWaiter::new(reader, self.waiter.config()).with_cancellation(cancellation);

        info!(
            target: "rbridge",
            chain = %registry.chain_name(self.chain_id),
            tx_hash = %self.tx_hash,
            confirmations = self.waiter.confirmations,
            "Waiting for confirmation"
        );
        let outcome = waiter.wait_for(self.chain_id, self.tx_hash).await?;
        println!("{}", describe_outcome(&registry, self.chain_id, &outcome));
        if let Some(url) = registry.explorer_tx_url(self.chain_id, self.tx_hash) {
            println!("{url}");
        }
        Ok(())
    }
}

/// One-line summary of a confirmation verdict.
pub(crate) fn describe_outcome(
    registry: &ChainRegistry,
    chain_id: ChainId,
    outcome: &ConfirmationOutcome,
) -> String {
    let chain = registry.chain_name(chain_id);
    match outcome {
        ConfirmationOutcome::Confirmed(receipt) => {
            format!("confirmed on {chain} in block {}", receipt.block_number)
        }
        ConfirmationOutcome::Reverted(receipt) => {
            format!("reverted on {chain} in block {}", receipt.block_number)
        }
        ConfirmationOutcome::TimedOut => format!("not confirmed on {chain} yet, gave up waiting"),
    }
}
