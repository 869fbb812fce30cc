use crate::{Metrics, MonitorConfig, Subscription};
use rbridge_rpc::{ReactiveLedgerReader, RpcError};
use std::sync::Arc;
use tokio::{sync::watch, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// The poll loop behind a running [`ReactiveMonitor`](crate::ReactiveMonitor).
///
/// `cursor` is the highest sequence number already processed. It is `None` until the first
/// successful head read, which places it `lookback` below the head.
#[derive(Debug)]
pub(crate) struct MonitorTask<R> {
    reader: Arc<R>,
    config: MonitorConfig,
    subscription: Subscription,
    cancellation: CancellationToken,
    cursor: Option<u64>,
    cursor_tx: watch::Sender<Option<u64>>,
}

impl<R> MonitorTask<R>
where
    R: ReactiveLedgerReader + 'static,
{
    pub(crate) const fn new(
        reader: Arc<R>,
        config: MonitorConfig,
        subscription: Subscription,
        cancellation: CancellationToken,
        cursor_tx: watch::Sender<Option<u64>>,
    ) -> Self {
        Self { reader, config, subscription, cancellation, cursor: None, cursor_tx }
    }

    /// Ticks every `poll_interval` until cancelled. A tick that comes due while the previous
    /// one is still fetching is dropped.
    pub(crate) async fn run(mut self) {
        let rvm_id = self.subscription.rvm_id.clone();
        Metrics::zero_monitor(&rvm_id);
        info!(target: "tracker::monitor", %rvm_id, "Monitor started");

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => break,
                _ = interval.tick() => {}
            }

            if let Err(err) = self.tick().await {
                Metrics::record_monitor_error(&rvm_id);
                warn!(
                    target: "tracker::monitor",
                    %rvm_id,
                    cursor = ?self.cursor,
                    %err,
                    "Monitor tick failed, retrying from the same cursor"
                );
            }
        }

        info!(target: "tracker::monitor", %rvm_id, cursor = ?self.cursor, "Monitor stopped");
    }

    /// One poll cycle. Returns the number of transactions dispatched.
    ///
    /// Fetches batches until the backlog up to the head read at the start of the tick is
    /// drained. Results that arrive after cancellation are dropped without dispatch.
    pub(crate) async fn tick(&mut self) -> Result<usize, RpcError> {
        if self.cancellation.is_cancelled() {
            return Ok(0);
        }
        let rvm_id = self.subscription.rvm_id.clone();
        let rvm_id = rvm_id.as_str();
        Metrics::record_tick(rvm_id);

        let head = self.reader.head_number(rvm_id).await?;
        if self.cancellation.is_cancelled() {
            return Ok(0);
        }

        let mut cursor = match self.cursor {
            Some(cursor) => cursor,
            None => {
                let start = head.saturating_sub(self.config.lookback);
                debug!(target: "tracker::monitor", rvm_id, head, cursor = start, "Initial cursor");
                self.advance(start);
                start
            }
        };

        let mut dispatched = 0;
        while head > cursor {
            let mut batch =
                self.reader.transactions(rvm_id, cursor + 1, self.config.batch_size).await?;
            if self.cancellation.is_cancelled() {
                debug!(
                    target: "tracker::monitor",
                    rvm_id,
                    cursor,
                    "Discarding batch fetched after stop"
                );
                return Ok(dispatched);
            }
            let full = batch.len() as u64 >= self.config.batch_size;
            batch.sort_by_key(|tx| tx.number);

            let mut highest = cursor;
            let mut scanned = 0;
            let mut matched = 0;
            for tx in &batch {
                if tx.number <= highest {
                    continue;
                }
                if self.cancellation.is_cancelled() {
                    if highest > cursor {
                        self.advance(highest);
                    }
                    return Ok(dispatched + matched as usize);
                }
                highest = tx.number;
                scanned += 1;
                if self.subscription.matches(tx) {
                    info!(
                        target: "tracker::monitor",
                        rvm_id,
                        number = tx.number,
                        hash = %tx.hash,
                        origin_chain_id = tx.origin_chain_id,
                        origin_tx_hash = %tx.origin_tx_hash,
                        "Matched transaction"
                    );
                    self.subscription.dispatch(tx);
                    matched += 1;
                } else {
                    trace!(
                        target: "tracker::monitor",
                        rvm_id,
                        number = tx.number,
                        "Skipped transaction"
                    );
                }
            }
            Metrics::record_scanned(rvm_id, scanned, matched, highest);
            dispatched += matched as usize;

            if highest == cursor {
                break;
            }
            cursor = highest;
            self.advance(cursor);
            if !full {
                break;
            }
        }
        Ok(dispatched)
    }

    fn advance(&mut self, cursor: u64) {
        self.cursor = Some(cursor);
        self.cursor_tx.send_replace(Some(cursor));
    }

    #[cfg(test)]
    pub(crate) const fn cursor(&self) -> Option<u64> {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::tests::{ScriptedLedger, recorder, tx};
    use alloy_transport::mock::{Asserter, MockTransport};
    use rbridge_rpc::{ReactiveLedgerClient, RpcClient};
    use rbridge_types::B256;
    use serde_json::json;
    use std::{sync::Mutex, time::Duration};

    fn task<R: ReactiveLedgerReader + 'static>(
        ledger: Arc<R>,
        subscription: Subscription,
        batch_size: u64,
    ) -> (MonitorTask<R>, CancellationToken) {
        let cancellation = CancellationToken::new();
        let config =
            MonitorConfig { batch_size, lookback: 0, poll_interval: Duration::from_secs(2) };
        let (cursor_tx, _) = watch::channel(None);
        let task = MonitorTask::new(ledger, config, subscription, cancellation.clone(), cursor_tx);
        (task, cancellation)
    }

    #[tokio::test]
    async fn test_first_tick_only_sets_cursor() {
        let ledger = ScriptedLedger::with_range(1..=10);
        let (seen, subscription) = recorder(|_| true);
        let (mut task, _) = task(ledger.clone(), subscription, 50);

        assert_eq!(task.tick().await.unwrap(), 0);
        assert_eq!(task.cursor(), Some(10));
        assert!(seen.lock().unwrap().is_empty());

        ledger.extend(11..=12);
        assert_eq!(task.tick().await.unwrap(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![11, 12]);
        assert_eq!(task.cursor(), Some(12));
    }

    #[tokio::test]
    async fn test_lookback_widens_first_scan() {
        let ledger = ScriptedLedger::with_range(1..=10);
        let (seen, subscription) = recorder(|_| true);
        let (mut task, _) = task(ledger, subscription, 50);
        task.config.lookback = 3;

        assert_eq!(task.tick().await.unwrap(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![8, 9, 10]);
    }

    #[tokio::test]
    async fn test_start_timestamp_filters_history() {
        let ledger = ScriptedLedger::with_range(1..=10);
        // Transaction `n` carries time `1000 + n`.
        let (seen, mut subscription) = recorder(|_| true);
        subscription.start_timestamp = 1_009;
        let (mut task, _) = task(ledger, subscription, 50);
        task.config.lookback = 5;

        task.tick().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![9, 10]);
        assert_eq!(task.cursor(), Some(10));
    }

    #[tokio::test]
    async fn test_drains_backlog_in_one_tick() {
        let ledger = ScriptedLedger::with_range(1..=1);
        let (seen, subscription) = recorder(|tx| tx.number % 2 == 0);
        let (mut task, _) = task(ledger.clone(), subscription, 4);
        task.tick().await.unwrap();

        ledger.extend(2..=11);
        assert_eq!(task.tick().await.unwrap(), 5);
        assert_eq!(*seen.lock().unwrap(), vec![2, 4, 6, 8, 10]);
        assert_eq!(task.cursor(), Some(11));
        // Head read, then batches from 2, 6 and 10.
        assert_eq!(ledger.fetches(), vec![2, 6, 10]);
    }

    #[tokio::test]
    async fn test_overlapping_batches_dispatch_once() {
        let ledger = ScriptedLedger::with_range(1..=1);
        ledger.set_overlap(3);
        let (seen, subscription) = recorder(|_| true);
        let (mut task, _) = task(ledger.clone(), subscription, 50);
        task.tick().await.unwrap();

        ledger.extend(2..=5);
        task.tick().await.unwrap();
        ledger.extend(6..=8);
        task.tick().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![2, 3, 4, 5, 6, 7, 8]);
    }

    fn ledger_tx(number: u64) -> serde_json::Value {
        json!({
            "hash": B256::with_last_byte(number as u8),
            "number": number.to_string(),
            "time": 1000 + number,
            "root": B256::ZERO,
            "limit": 900000,
            "used": 47429,
            "type": 2,
            "status": 1,
            "from": "0x0000000000000000000000000000000000ffffff",
            "to": "0x1111111111111111111111111111111111111111",
            "createContract": false,
            "sessionId": "1",
            "refChainId": 11155111,
            "refTx": B256::ZERO,
            "refEventIndex": 0,
            "data": "0x",
            "rData": "0x",
        })
    }

    #[tokio::test]
    async fn test_overlapping_page_from_node_advances() {
        let asserter = Asserter::new();
        let client = RpcClient::new(MockTransport::new(asserter.clone()), "lasna");
        let reader = Arc::new(ReactiveLedgerClient::new(client));
        let (seen, subscription) = recorder(|_| true);
        let (mut task, _) = task(reader, subscription, 50);

        asserter.push_success(&"3");
        assert_eq!(task.tick().await.unwrap(), 0);
        assert_eq!(task.cursor(), Some(3));

        // Asked for 4 onwards, the node repeats 3.
        asserter.push_success(&"5");
        asserter.push_success(&json!([ledger_tx(3), ledger_tx(4), ledger_tx(5)]));
        assert_eq!(task.tick().await.unwrap(), 2);
        assert_eq!(task.cursor(), Some(5));

        asserter.push_success(&"7");
        asserter.push_success(&json!([ledger_tx(5), ledger_tx(7), ledger_tx(6)]));
        assert_eq!(task.tick().await.unwrap(), 2);
        assert_eq!(task.cursor(), Some(7));
        assert_eq!(*seen.lock().unwrap(), vec![4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn test_stop_mid_batch_publishes_dispatched_cursor() {
        let ledger = ScriptedLedger::with_range(1..=1);
        let cancellation = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (sink, stopper) = (seen.clone(), cancellation.clone());
        let subscription = Subscription::new(
            "rvm",
            0,
            |_| true,
            move |tx| {
                sink.lock().unwrap().push(tx.number);
                if tx.number == 3 {
                    stopper.cancel();
                }
            },
        );
        let config =
            MonitorConfig { batch_size: 50, lookback: 0, poll_interval: Duration::from_secs(2) };
        let (cursor_tx, cursor_rx) = watch::channel(None);
        let mut task =
            MonitorTask::new(ledger.clone(), config, subscription, cancellation, cursor_tx);
        task.tick().await.unwrap();

        ledger.extend(2..=5);
        assert_eq!(task.tick().await.unwrap(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
        assert_eq!(task.cursor(), Some(3));
        assert_eq!(*cursor_rx.borrow(), Some(3));
    }

    #[tokio::test]
    async fn test_error_keeps_cursor() {
        let ledger = ScriptedLedger::with_range(1..=3);
        let (seen, subscription) = recorder(|_| true);
        let (mut task, _) = task(ledger.clone(), subscription, 50);
        task.tick().await.unwrap();

        ledger.extend(4..=5);
        ledger.fail_next_batch(RpcError::Transport("connection reset".into()));
        assert!(task.tick().await.is_err());
        assert_eq!(task.cursor(), Some(3));

        assert_eq!(task.tick().await.unwrap(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_predicate_on_origin_reference() {
        let ledger = ScriptedLedger::with_range(1..=1);
        let origin = B256::repeat_byte(0x42);
        let (seen, subscription) = recorder(move |tx| tx.origin_tx_hash == origin);
        let (mut task, _) = task(ledger.clone(), subscription, 50);
        task.tick().await.unwrap();

        ledger.push(tx(2));
        ledger.push(ScriptedLedger::relay(3, origin));
        ledger.push(tx(4));
        ledger.push(ScriptedLedger::relay(5, origin));
        task.tick().await.unwrap();
        task.tick().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![3, 5]);
    }

    #[tokio::test]
    async fn test_fetch_resolving_after_stop_is_discarded() {
        let ledger = ScriptedLedger::with_range(1..=1);
        let (seen, subscription) = recorder(|_| true);
        let (mut task, cancellation) = task(ledger.clone(), subscription, 50);
        task.tick().await.unwrap();

        ledger.extend(2..=4);
        let gate = ledger.gate_batches();
        let pending = tokio::spawn(async move {
            let dispatched = task.tick().await.unwrap();
            (dispatched, task.cursor())
        });

        gate.entered.notified().await;
        cancellation.cancel();
        gate.release.notify_one();

        let (dispatched, cursor) = pending.await.unwrap();
        assert_eq!(dispatched, 0);
        assert_eq!(cursor, Some(1));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_task_does_not_fetch() {
        let ledger = ScriptedLedger::with_range(1..=5);
        let (_, subscription) = recorder(|_| true);
        let (mut task, cancellation) = task(ledger.clone(), subscription, 50);
        cancellation.cancel();
        assert_eq!(task.tick().await.unwrap(), 0);
        assert_eq!(ledger.head_reads(), 0);
    }
}
