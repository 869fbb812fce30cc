use crate::ConfirmationOutcome;
use alloy_primitives::{B256, ChainId};
use rbridge_settlement::{Resolution, SettlementTimeline, TimelineError};
use rbridge_types::ReactiveTransaction;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// A [`SettlementTimeline`] shared between the tasks that observe its steps.
///
/// Confirmation verdicts and matched relays resolve pending steps as they arrive. Cloning
/// yields another handle to the same timeline.
#[derive(Debug, Clone, Default)]
pub struct TimelineRecorder {
    timeline: Arc<Mutex<SettlementTimeline>>,
}

impl TimelineRecorder {
    /// Wraps `timeline`.
    pub fn new(timeline: SettlementTimeline) -> Self {
        Self { timeline: Arc::new(Mutex::new(timeline)) }
    }

    /// Records the four standard steps of an order moving between the given chains.
    pub fn standard(origin: ChainId, destination: ChainId) -> Self {
        Self::new(SettlementTimeline::standard(origin, destination))
    }

    /// Resolves `step` from a confirmation verdict on `tx_hash`.
    ///
    /// A timed-out wait leaves the step pending and returns `false`.
    pub fn record_confirmation(
        &self,
        step: usize,
        tx_hash: B256,
        outcome: &ConfirmationOutcome,
        timestamp: u64,
    ) -> Result<bool, TimelineError> {
        let success = match outcome {
            ConfirmationOutcome::Confirmed(_) => true,
            ConfirmationOutcome::Reverted(_) => false,
            ConfirmationOutcome::TimedOut => {
                debug!(target: "tracker::timeline", step, %tx_hash, "Step still pending");
                return Ok(false);
            }
        };
        let resolution = Resolution { tx_hash, timestamp, success, gas_used: None };
        let mut timeline = self.lock();
        let event = timeline.resolve(step, resolution)?;
        info!(
            target: "tracker::timeline",
            step,
            name = %event.name,
            status = %event.status,
            %tx_hash,
            "Step resolved"
        );
        Ok(true)
    }

    /// Resolves `step` from a coordinating-ledger transaction.
    pub fn record_relay(
        &self,
        step: usize,
        tx: &ReactiveTransaction,
    ) -> Result<(), TimelineError> {
        let resolution = Resolution {
            tx_hash: tx.hash,
            timestamp: tx.time,
            success: tx.is_success(),
            gas_used: Some(tx.gas_used),
        };
        let mut timeline = self.lock();
        let event = timeline.resolve(step, resolution)?;
        info!(
            target: "tracker::timeline",
            step,
            name = %event.name,
            status = %event.status,
            tx_hash = %tx.hash,
            number = tx.number,
            "Step resolved"
        );
        Ok(())
    }

    /// A subscription callback resolving `step` with the first matched transaction.
    ///
    /// Later matches find the step resolved and are ignored.
    pub fn relay_callback(
        &self,
        step: usize,
    ) -> impl Fn(&ReactiveTransaction) + Send + Sync + 'static {
        let recorder = self.clone();
        move |tx| {
            if let Err(err) = recorder.record_relay(step, tx) {
                debug!(
                    target: "tracker::timeline",
                    step,
                    tx_hash = %tx.hash,
                    %err,
                    "Relay not recorded"
                );
            }
        }
    }

    /// A copy of the timeline as it stands.
    pub fn snapshot(&self) -> SettlementTimeline {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SettlementTimeline> {
        self.timeline.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
