//! Coordinating ledger monitor.
//!
//! A [`ReactiveMonitor`] is `Idle` until [`ReactiveMonitor::start`] spawns its poll loop and
//! `Polling` until [`ReactiveMonitor::stop`]. Each tick reads the head sequence number and
//! fetches every transaction between the cursor and that head, evaluating the
//! [`Subscription`] against each in ascending order. The cursor advances past every scanned
//! transaction, matching or not, so nothing is dispatched twice.

use crate::{MonitorConfig, MonitorError};
use rbridge_rpc::ReactiveLedgerReader;
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

mod subscription;
pub use subscription::{Callback, Correlation, Predicate, Subscription};

mod task;
use task::MonitorTask;

/// Lifecycle state of a [`ReactiveMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MonitorState {
    /// Not polling.
    #[display("idle")]
    Idle,
    /// A poll loop is running.
    #[display("polling")]
    Polling,
}

#[derive(Debug)]
struct Running {
    cancellation: CancellationToken,
    handle: JoinHandle<()>,
}

/// Follows the coordinating ledger for transactions matching a [`Subscription`].
#[derive(Debug)]
pub struct ReactiveMonitor<R> {
    reader: Arc<R>,
    config: MonitorConfig,
    cancellation: CancellationToken,
    running: Option<Running>,
    retired: Vec<JoinHandle<()>>,
    cursor_rx: watch::Receiver<Option<u64>>,
}

impl<R> ReactiveMonitor<R>
where
    R: ReactiveLedgerReader + 'static,
{
    /// Creates an idle monitor reading through `reader`.
    pub fn new(reader: Arc<R>, config: MonitorConfig) -> Self {
        let (_, cursor_rx) = watch::channel(None);
        Self {
            reader,
            config,
            cancellation: CancellationToken::new(),
            running: None,
            retired: Vec::new(),
            cursor_rx,
        }
    }

    /// Stops the monitor when `cancellation` fires, in addition to [`Self::stop`].
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Spawns the poll loop for `subscription`.
    ///
    /// The cursor starts over for every start: the first tick places it
    /// [`MonitorConfig::lookback`] sequence numbers below the head. A stopped loop that is
    /// still finishing its last fetch is kept until [`Self::shutdown`].
    pub fn start(&mut self, subscription: Subscription) -> Result<(), MonitorError> {
        if self.state() == MonitorState::Polling {
            return Err(MonitorError::AlreadyRunning);
        }
        if subscription.rvm_id.trim().is_empty() {
            return Err(MonitorError::MissingRvmId);
        }
        if self.config.batch_size == 0 {
            return Err(MonitorError::InvalidConfig("batch size must be non-zero"));
        }
        if self.config.poll_interval.is_zero() {
            return Err(MonitorError::InvalidConfig("poll interval must be non-zero"));
        }

        if let Some(previous) = self.running.take() {
            if !previous.handle.is_finished() {
                debug!(target: "tracker::monitor", "Previous poll loop still exiting");
                self.retired.push(previous.handle);
            }
        }
        self.retired.retain(|handle| !handle.is_finished());

        let cancellation = self.cancellation.child_token();
        let (cursor_tx, cursor_rx) = watch::channel(None);
        let task = MonitorTask::new(
            self.reader.clone(),
            self.config,
            subscription,
            cancellation.clone(),
            cursor_tx,
        );
        self.cursor_rx = cursor_rx;
        self.running = Some(Running { cancellation, handle: tokio::spawn(task.run()) });
        Ok(())
    }

    /// Requests the poll loop to stop. Takes effect before the next tick; a fetch already in
    /// flight completes but its results are not dispatched.
    pub fn stop(&self) {
        if let Some(running) = &self.running {
            running.cancellation.cancel();
        }
    }

    /// Stops the poll loop and waits for it, and any loop stopped before a restart, to exit.
    pub async fn shutdown(&mut self) {
        self.stop();
        let handles = self.running.take().map(|running| running.handle);
        for handle in std::mem::take(&mut self.retired).into_iter().chain(handles) {
            if let Err(err) = handle.await {
                error!(target: "tracker::monitor", %err, "Monitor task failed");
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        match &self.running {
            Some(running) if !running.cancellation.is_cancelled() => MonitorState::Polling,
            _ => MonitorState::Idle,
        }
    }

    /// Highest sequence number processed by the current or last run.
    pub fn cursor(&self) -> Option<u64> {
        *self.cursor_rx.borrow()
    }

    /// Follows cursor updates of the current run.
    pub fn watch_cursor(&self) -> watch::Receiver<Option<u64>> {
        self.cursor_rx.clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use rbridge_rpc::RpcError;
    use rbridge_types::{Address, B256, ReactiveLog, ReactiveTransaction, U256};
    use std::{ops::RangeInclusive, sync::Mutex, time::Duration};
    use tokio::sync::Notify;

    /// Lets a test hold a batch fetch open.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct Gate {
        pub(crate) entered: Arc<Notify>,
        pub(crate) release: Arc<Notify>,
    }

    #[derive(Debug, Default)]
    struct LedgerState {
        txs: Vec<ReactiveTransaction>,
        overlap: u64,
        fail_next: Option<RpcError>,
        gate: Option<Gate>,
        fetches: Vec<u64>,
        head_reads: usize,
    }

    /// An in-memory coordinating ledger.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedLedger {
        state: Mutex<LedgerState>,
    }

    pub(crate) fn tx(number: u64) -> ReactiveTransaction {
        ReactiveTransaction {
            hash: B256::from(U256::from(number)),
            number,
            time: 1_000 + number,
            root: B256::ZERO,
            gas_limit: 900_000,
            gas_used: 47_429,
            tx_type: 2,
            status: 1,
            from: Address::ZERO,
            to: Some(Address::repeat_byte(0x11)),
            create_contract: false,
            session_id: 1,
            origin_chain_id: 11155111,
            origin_tx_hash: B256::ZERO,
            origin_event_index: 0,
            data: Default::default(),
            return_data: Default::default(),
        }
    }

    /// A subscription accepting what `predicate` accepts, recording dispatched numbers.
    pub(crate) fn recorder(
        predicate: impl Fn(&ReactiveTransaction) -> bool + Send + Sync + 'static,
    ) -> (Arc<Mutex<Vec<u64>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = Subscription::new("rvm", 0, predicate, move |tx| {
            sink.lock().unwrap().push(tx.number);
        });
        (seen, subscription)
    }

    impl ScriptedLedger {
        pub(crate) fn with_range(range: RangeInclusive<u64>) -> Arc<Self> {
            let ledger = Arc::new(Self::default());
            ledger.extend(range);
            ledger
        }

        pub(crate) fn relay(number: u64, origin_tx_hash: B256) -> ReactiveTransaction {
            ReactiveTransaction { origin_tx_hash, ..tx(number) }
        }

        pub(crate) fn extend(&self, range: RangeInclusive<u64>) {
            self.state.lock().unwrap().txs.extend(range.map(tx));
        }

        pub(crate) fn push(&self, tx: ReactiveTransaction) {
            self.state.lock().unwrap().txs.push(tx);
        }

        /// Serve batches starting `overlap` numbers before the requested start.
        pub(crate) fn set_overlap(&self, overlap: u64) {
            self.state.lock().unwrap().overlap = overlap;
        }

        pub(crate) fn fail_next_batch(&self, err: RpcError) {
            self.state.lock().unwrap().fail_next = Some(err);
        }

        pub(crate) fn gate_batches(&self) -> Gate {
            let gate = Gate::default();
            self.state.lock().unwrap().gate = Some(gate.clone());
            gate
        }

        pub(crate) fn ungate(&self) {
            self.state.lock().unwrap().gate = None;
        }

        pub(crate) fn fetches(&self) -> Vec<u64> {
            self.state.lock().unwrap().fetches.clone()
        }

        pub(crate) fn head_reads(&self) -> usize {
            self.state.lock().unwrap().head_reads
        }
    }

    #[async_trait]
    impl ReactiveLedgerReader for ScriptedLedger {
        async fn transaction_by_hash(
            &self,
            _rvm_id: &str,
            hash: B256,
        ) -> Result<Option<ReactiveTransaction>, RpcError> {
            Ok(self.state.lock().unwrap().txs.iter().find(|tx| tx.hash == hash).cloned())
        }

        async fn transaction_by_number(
            &self,
            _rvm_id: &str,
            number: u64,
        ) -> Result<Option<ReactiveTransaction>, RpcError> {
            Ok(self.state.lock().unwrap().txs.iter().find(|tx| tx.number == number).cloned())
        }

        async fn transaction_logs(
            &self,
            _rvm_id: &str,
            _number: u64,
        ) -> Result<Vec<ReactiveLog>, RpcError> {
            Ok(vec![])
        }

        async fn head_number(&self, _rvm_id: &str) -> Result<u64, RpcError> {
            let mut state = self.state.lock().unwrap();
            state.head_reads += 1;
            Ok(state.txs.iter().map(|tx| tx.number).max().unwrap_or_default())
        }

        async fn transactions(
            &self,
            _rvm_id: &str,
            from: u64,
            limit: u64,
        ) -> Result<Vec<ReactiveTransaction>, RpcError> {
            let (gate, result) = {
                let mut state = self.state.lock().unwrap();
                state.fetches.push(from);
                let start = from.saturating_sub(state.overlap);
                let result = match state.fail_next.take() {
                    Some(err) => Err(err),
                    None => Ok(state
                        .txs
                        .iter()
                        .filter(|tx| tx.number >= start)
                        .take(limit as usize)
                        .cloned()
                        .collect()),
                };
                (state.gate.clone(), result)
            };
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            result
        }

        async fn address_mapping(&self, address: Address) -> Result<Address, RpcError> {
            Ok(address)
        }
    }

    fn config() -> MonitorConfig {
        MonitorConfig { poll_interval: Duration::from_secs(2), batch_size: 50, lookback: 0 }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle() {
        let ledger = ScriptedLedger::with_range(1..=3);
        let mut monitor = ReactiveMonitor::new(ledger, config());
        assert_eq!(monitor.state(), MonitorState::Idle);

        let (_, subscription) = recorder(|_| true);
        monitor.start(subscription.clone()).unwrap();
        assert_eq!(monitor.state(), MonitorState::Polling);
        assert_eq!(monitor.start(subscription.clone()), Err(MonitorError::AlreadyRunning));

        monitor.stop();
        assert_eq!(monitor.state(), MonitorState::Idle);
        monitor.start(subscription).unwrap();
        monitor.shutdown().await;
        assert_eq!(monitor.state(), MonitorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_exiting_loop_until_shutdown() {
        let ledger = ScriptedLedger::with_range(1..=3);
        let gate = ledger.gate_batches();
        let mut monitor =
            ReactiveMonitor::new(ledger.clone(), MonitorConfig { lookback: 2, ..config() });

        let (stale, subscription) = recorder(|_| true);
        monitor.start(subscription).unwrap();
        gate.entered.notified().await;
        monitor.stop();

        ledger.ungate();
        let (seen, subscription) = recorder(|_| true);
        monitor.start(subscription).unwrap();
        assert_eq!(monitor.retired.len(), 1);
        let mut cursor = monitor.watch_cursor();
        cursor.wait_for(|c| *c == Some(3)).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);

        gate.release.notify_one();
        monitor.shutdown().await;
        assert!(monitor.retired.is_empty());
        // Only the test and the monitor still hold the reader.
        assert_eq!(Arc::strong_count(&ledger), 2);
        assert!(stale.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_validation() {
        let ledger = ScriptedLedger::with_range(1..=3);
        let (_, subscription) = recorder(|_| true);

        let mut monitor = ReactiveMonitor::new(ledger.clone(), config());
        let mut anonymous = subscription.clone();
        anonymous.rvm_id = " ".to_string();
        assert_eq!(monitor.start(anonymous), Err(MonitorError::MissingRvmId));

        let mut monitor =
            ReactiveMonitor::new(ledger, MonitorConfig { batch_size: 0, ..config() });
        assert!(matches!(monitor.start(subscription), Err(MonitorError::InvalidConfig(_))));
        assert_eq!(monitor.state(), MonitorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_new_transactions_until_stopped() {
        let ledger = ScriptedLedger::with_range(1..=3);
        let mut monitor = ReactiveMonitor::new(ledger.clone(), config());
        let (seen, subscription) = recorder(|_| true);
        monitor.start(subscription).unwrap();

        let mut cursor = monitor.watch_cursor();
        cursor.wait_for(|c| *c == Some(3)).await.unwrap();
        ledger.extend(4..=6);
        cursor.wait_for(|c| *c == Some(6)).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![4, 5, 6]);
        assert_eq!(monitor.cursor(), Some(6));

        monitor.shutdown().await;
        ledger.extend(7..=9);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(*seen.lock().unwrap(), vec![4, 5, 6]);
        assert_eq!(monitor.cursor(), Some(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_stops_monitor() {
        let ledger = ScriptedLedger::with_range(1..=3);
        let token = CancellationToken::new();
        let mut monitor =
            ReactiveMonitor::new(ledger, config()).with_cancellation(token.clone());
        let (_, subscription) = recorder(|_| true);
        monitor.start(subscription).unwrap();

        token.cancel();
        assert_eq!(monitor.state(), MonitorState::Idle);
        monitor.shutdown().await;
    }

    #[test]
    fn test_correlation() {
        let origin = B256::repeat_byte(0x42);
        let relay = ScriptedLedger::relay(7, origin);

        assert!(Correlation::default().matches(&relay));
        assert!(Correlation::origin(11155111, origin).matches(&relay));
        assert!(!Correlation::origin(84532, origin).matches(&relay));
        assert!(!Correlation::origin(11155111, B256::ZERO).matches(&relay));
        assert!(
            Correlation::origin(11155111, origin)
                .with_recipient(Address::repeat_byte(0x11))
                .matches(&relay)
        );
        assert!(
            !Correlation::origin(11155111, origin).with_recipient(Address::ZERO).matches(&relay)
        );
    }

    #[test]
    fn test_subscription_respects_start_timestamp() {
        let (_, mut subscription) = recorder(Correlation::default().into_predicate());
        subscription.start_timestamp = 1_005;
        assert!(!subscription.matches(&tx(4)));
        assert!(subscription.matches(&tx(5)));
        assert!(format!("{subscription:?}").contains("rvm"));
    }
}
