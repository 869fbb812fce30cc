//! Bounded polling for transaction confirmations.

use crate::{Metrics, WaitError, WaiterConfig};
use alloy_primitives::{B256, ChainId};
use rbridge_rpc::{OriginChainReader, RpcError};
use rbridge_types::ChainReceipt;
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// The verdict of a confirmation wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Mined, succeeded and buried under the required number of blocks.
    Confirmed(ChainReceipt),
    /// Mined and reverted.
    Reverted(ChainReceipt),
    /// The attempt budget ran out first. The transaction may still land later.
    TimedOut,
}

impl ConfirmationOutcome {
    /// Returns `true` for [`Self::Confirmed`].
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// The receipt behind a definitive verdict.
    pub const fn receipt(&self) -> Option<&ChainReceipt> {
        match self {
            Self::Confirmed(receipt) | Self::Reverted(receipt) => Some(receipt),
            Self::TimedOut => None,
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Confirmed(_) => Metrics::OUTCOME_CONFIRMED,
            Self::Reverted(_) => Metrics::OUTCOME_REVERTED,
            Self::TimedOut => Metrics::OUTCOME_TIMED_OUT,
        }
    }
}

/// Waits for submitted transactions to be mined.
///
/// Each attempt reads the receipt and, when more than one confirmation is required, the
/// chain head. Absent receipts and retryable RPC failures both use up an attempt and are
/// retried after [`WaiterConfig::poll_interval`]. Any other failure ends the wait with
/// [`WaitError::Rpc`]. The wait never issues more than [`WaiterConfig::max_attempts`]
/// attempts.
#[derive(Debug)]
pub struct ConfirmationWaiter<R> {
    reader: Arc<R>,
    config: WaiterConfig,
    cancellation: CancellationToken,
}

impl<R> ConfirmationWaiter<R>
where
    R: OriginChainReader,
{
    /// Creates a waiter reading through `reader`.
    pub fn new(reader: Arc<R>, config: WaiterConfig) -> Self {
        Self { reader, config, cancellation: CancellationToken::new() }
    }

    /// Aborts pending waits when `cancellation` fires.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// The waiter's settings.
    pub const fn config(&self) -> &WaiterConfig {
        &self.config
    }

    /// Polls until `hash` reaches a verdict on `chain_id` or the attempt budget runs out.
    ///
    /// Fails fast with [`WaitError::UnsupportedChain`] before polling when the reader
    /// cannot serve the chain.
    pub async fn wait_for(
        &self,
        chain_id: ChainId,
        hash: B256,
    ) -> Result<ConfirmationOutcome, WaitError> {
        if !self.reader.supports_chain(chain_id) {
            return Err(WaitError::UnsupportedChain(chain_id));
        }
        Metrics::zero_waiter(chain_id);

        let started = Instant::now();
        let mut outcome = ConfirmationOutcome::TimedOut;
        for attempt in 1..=self.config.max_attempts {
            if self.cancellation.is_cancelled() {
                return Err(WaitError::Cancelled);
            }
            Metrics::record_poll(chain_id);

            match self.attempt(chain_id, hash).await {
                Ok(Some(verdict)) => {
                    outcome = verdict;
                    break;
                }
                Ok(None) => {
                    trace!(
                        target: "tracker::waiter",
                        chain_id,
                        %hash,
                        attempt,
                        "Not confirmed yet"
                    );
                }
                Err(err) if !err.is_retryable() => {
                    Metrics::record_waiter_error(chain_id);
                    error!(
                        target: "tracker::waiter",
                        chain_id,
                        %hash,
                        attempt,
                        %err,
                        "Receipt poll failed permanently"
                    );
                    return Err(WaitError::Rpc(err));
                }
                Err(err) => {
                    Metrics::record_waiter_error(chain_id);
                    warn!(
                        target: "tracker::waiter",
                        chain_id,
                        %hash,
                        attempt,
                        %err,
                        "Receipt poll failed"
                    );
                }
            }

            if attempt < self.config.max_attempts {
                tokio::select! {
                    _ = self.cancellation.cancelled() => return Err(WaitError::Cancelled),
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
            }
        }

        Metrics::record_outcome(chain_id, outcome.label(), started.elapsed().as_secs_f64());
        match &outcome {
            ConfirmationOutcome::TimedOut => info!(
                target: "tracker::waiter",
                chain_id,
                %hash,
                max_attempts = self.config.max_attempts,
                "Gave up waiting for confirmation"
            ),
            ConfirmationOutcome::Confirmed(receipt) | ConfirmationOutcome::Reverted(receipt) => {
                info!(
                    target: "tracker::waiter",
                    chain_id,
                    %hash,
                    block_number = receipt.block_number,
                    status = %receipt.status,
                    "Transaction mined"
                )
            }
        }
        Ok(outcome)
    }

    /// One attempt. `Ok(None)` means no verdict yet.
    async fn attempt(
        &self,
        chain_id: ChainId,
        hash: B256,
    ) -> Result<Option<ConfirmationOutcome>, RpcError> {
        let Some(receipt) = self.reader.receipt(chain_id, hash).await? else {
            return Ok(None);
        };
        if !receipt.is_success() {
            return Ok(Some(ConfirmationOutcome::Reverted(receipt)));
        }
        let required = self.config.required_confirmations;
        if required <= 1 {
            return Ok(Some(ConfirmationOutcome::Confirmed(receipt)));
        }

        let head = self.reader.block_number(chain_id).await?;
        let confirmations = head.checked_sub(receipt.block_number).map_or(0, |depth| depth + 1);
        if confirmations >= required {
            return Ok(Some(ConfirmationOutcome::Confirmed(receipt)));
        }
        debug!(
            target: "tracker::waiter",
            chain_id,
            %hash,
            confirmations,
            required,
            "Awaiting more confirmations"
        );
        Ok(None)
    }
}
