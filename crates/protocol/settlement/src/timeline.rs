//! Cross-chain settlement timeline.
//!
//! A settlement moves through a fixed sequence of steps spread over three ledgers. The
//! timeline is built once with every step pending and is then filled in as the matching
//! transactions are discovered. Steps are never reordered or removed.

use crate::TimelineError;
use alloy_primitives::{B256, ChainId};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Ledger a timeline step executes on.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainRef {
    /// An origin or destination chain.
    #[display("{_0}")]
    Chain(ChainId),
    /// The coordinating ledger.
    #[display("reactive")]
    Reactive(ReactiveTag),
}

impl ChainRef {
    /// The coordinating ledger.
    pub const REACTIVE: Self = Self::Reactive(ReactiveTag::Reactive);
}

/// Symbolic identifier of the coordinating ledger, serialized as `"reactive"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactiveTag {
    /// The only value.
    Reactive,
}

/// Progress of a single timeline step.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Transaction observed and succeeded.
    #[display("completed")]
    Completed,
    /// Not observed yet.
    #[display("pending")]
    Pending,
    /// Transaction observed and failed.
    #[display("failed")]
    Failed,
}

/// One step of a settlement timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainEvent {
    /// One-based position in the timeline.
    pub step: usize,
    /// Human-readable label.
    pub name: String,
    /// Ledger the step executes on.
    pub chain: ChainRef,
    /// Transaction that realised the step, once known.
    pub tx_hash: Option<B256>,
    /// Time the step was realised, unix seconds. Zero while pending.
    pub timestamp: u64,
    /// Progress.
    pub status: EventStatus,
    /// Gas consumed, when the ledger reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
}

impl CrossChainEvent {
    /// A step that has not been observed yet.
    pub fn pending(step: usize, name: impl Into<String>, chain: ChainRef) -> Self {
        Self {
            step,
            name: name.into(),
            chain,
            tx_hash: None,
            timestamp: 0,
            status: EventStatus::Pending,
            gas_used: None,
        }
    }
}

/// The observation that resolves a pending step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Transaction that realised the step.
    pub tx_hash: B256,
    /// Time it was observed or executed, unix seconds.
    pub timestamp: u64,
    /// `true` if the transaction succeeded.
    pub success: bool,
    /// Gas consumed, if known.
    pub gas_used: Option<u64>,
}

/// Step indices of [`SettlementTimeline::standard`].
pub mod steps {
    /// Deposit mined on the origin chain.
    pub const ORDER_PLACED: usize = 1;
    /// Relay executed on the coordinating ledger.
    pub const REACTIVE_PROCESSING: usize = 2;
    /// Order mirrored on the destination chain.
    pub const ORDER_RECEIVED: usize = 3;
    /// Counterparty fill on the destination chain.
    pub const MARKET_MAKER_FILL: usize = 4;
}

/// An ordered, append-only sequence of [`CrossChainEvent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementTimeline {
    events: Vec<CrossChainEvent>,
}

impl SettlementTimeline {
    /// The four-step timeline of an order moving from `origin` to `destination`.
    pub fn standard(origin: ChainId, destination: ChainId) -> Self {
        let mut timeline = Self::default();
        timeline.push("Order Placed", ChainRef::Chain(origin));
        timeline.push("Reactive Processing", ChainRef::REACTIVE);
        timeline.push("Order Received", ChainRef::Chain(destination));
        timeline.push("Market Maker Fill", ChainRef::Chain(destination));
        timeline
    }

    /// Appends a pending step and returns its index.
    pub fn push(&mut self, name: impl Into<String>, chain: ChainRef) -> usize {
        let step = self.events.len() + 1;
        self.events.push(CrossChainEvent::pending(step, name, chain));
        step
    }

    /// Resolves a pending step. Each step resolves at most once.
    pub fn resolve(
        &mut self,
        step: usize,
        resolution: Resolution,
    ) -> Result<&CrossChainEvent, TimelineError> {
        let event = step
            .checked_sub(1)
            .and_then(|index| self.events.get_mut(index))
            .ok_or(TimelineError::UnknownStep(step))?;
        if event.status != EventStatus::Pending {
            return Err(TimelineError::AlreadyResolved(step));
        }
        event.tx_hash = Some(resolution.tx_hash);
        event.timestamp = resolution.timestamp;
        event.gas_used = resolution.gas_used;
        event.status =
            if resolution.success { EventStatus::Completed } else { EventStatus::Failed };
        Ok(&*event)
    }

    /// The step with the given one-based index.
    pub fn get(&self, step: usize) -> Option<&CrossChainEvent> {
        self.events.get(step.checked_sub(1)?)
    }

    /// The first step still pending.
    pub fn current_step(&self) -> Option<&CrossChainEvent> {
        self.events.iter().find(|event| event.status == EventStatus::Pending)
    }

    /// `true` once every step completed.
    pub fn is_settled(&self) -> bool {
        !self.events.is_empty() && self.events.iter().all(|e| e.status == EventStatus::Completed)
    }

    /// `true` if any step failed.
    pub fn has_failed(&self) -> bool {
        self.events.iter().any(|event| event.status == EventStatus::Failed)
    }

    /// All steps, in order.
    pub fn events(&self) -> &[CrossChainEvent] {
        &self.events
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` if the timeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
