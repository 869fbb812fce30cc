use alloy_primitives::{Address, B256, ChainId};
use rbridge_types::ReactiveTransaction;
use std::{fmt, sync::Arc};

/// Decides whether a coordinating-ledger transaction is of interest.
pub type Predicate = Arc<dyn Fn(&ReactiveTransaction) -> bool + Send + Sync>;

/// Receives every transaction a [`Predicate`] accepted.
pub type Callback = Arc<dyn Fn(&ReactiveTransaction) + Send + Sync>;

/// What a [`ReactiveMonitor`](crate::ReactiveMonitor) watches for, and who to tell.
#[derive(Clone)]
pub struct Subscription {
    /// Execution environment to follow.
    pub rvm_id: String,
    /// Unix time the originating action was submitted. Earlier transactions are skipped.
    pub start_timestamp: u64,
    predicate: Predicate,
    on_match: Callback,
}

impl Subscription {
    /// Creates a subscription.
    pub fn new(
        rvm_id: impl Into<String>,
        start_timestamp: u64,
        predicate: impl Fn(&ReactiveTransaction) -> bool + Send + Sync + 'static,
        on_match: impl Fn(&ReactiveTransaction) + Send + Sync + 'static,
    ) -> Self {
        Self {
            rvm_id: rvm_id.into(),
            start_timestamp,
            predicate: Arc::new(predicate),
            on_match: Arc::new(on_match),
        }
    }

    /// Returns `true` if `tx` is recent enough and accepted by the predicate.
    pub fn matches(&self, tx: &ReactiveTransaction) -> bool {
        tx.time >= self.start_timestamp && (self.predicate)(tx)
    }

    pub(crate) fn dispatch(&self, tx: &ReactiveTransaction) {
        (self.on_match)(tx)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("rvm_id", &self.rvm_id)
            .field("start_timestamp", &self.start_timestamp)
            .finish_non_exhaustive()
    }
}

/// Matches coordinating-ledger transactions against a known origin action.
///
/// Unset fields match anything; an empty correlation matches every transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Correlation {
    /// Expected recipient on the coordinating ledger.
    pub recipient: Option<Address>,
    /// Chain the originating action was submitted on.
    pub origin_chain_id: Option<ChainId>,
    /// Hash of the originating transaction.
    pub origin_tx_hash: Option<B256>,
}

impl Correlation {
    /// A correlation on the originating transaction.
    pub const fn origin(chain_id: ChainId, tx_hash: B256) -> Self {
        Self { recipient: None, origin_chain_id: Some(chain_id), origin_tx_hash: Some(tx_hash) }
    }

    /// Also require the given recipient.
    pub const fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Returns `true` if `tx` agrees with every set field.
    pub fn matches(&self, tx: &ReactiveTransaction) -> bool {
        self.recipient.is_none_or(|recipient| tx.to == Some(recipient))
            && self.origin_chain_id.is_none_or(|chain_id| tx.origin_chain_id == chain_id)
            && self.origin_tx_hash.is_none_or(|hash| tx.origin_tx_hash == hash)
    }

    /// The correlation as a subscription predicate.
    pub fn into_predicate(self) -> impl Fn(&ReactiveTransaction) -> bool + Send + Sync + 'static {
        move |tx| self.matches(tx)
    }
}
