use alloy_primitives::ChainId;

/// Metrics recorded by the waiter and the monitor.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Receipt polls issued by confirmation waiters.
    pub const CONFIRMATION_POLLS_TOTAL: &'static str = "rbridge_confirmation_polls_total";
    /// Confirmation verdicts, labelled by outcome.
    pub const CONFIRMATION_OUTCOMES_TOTAL: &'static str = "rbridge_confirmation_outcomes_total";
    /// Retryable RPC failures swallowed by confirmation waiters.
    pub const CONFIRMATION_RPC_ERRORS_TOTAL: &'static str =
        "rbridge_confirmation_rpc_errors_total";
    /// Time from the first poll to a verdict.
    pub const CONFIRMATION_DURATION_SECONDS: &'static str =
        "rbridge_confirmation_duration_seconds";

    /// Monitor ticks started.
    pub const MONITOR_TICKS_TOTAL: &'static str = "rbridge_monitor_ticks_total";
    /// RPC failures swallowed by monitors.
    pub const MONITOR_RPC_ERRORS_TOTAL: &'static str = "rbridge_monitor_rpc_errors_total";
    /// Coordinating-ledger transactions scanned.
    pub const MONITOR_SCANNED_TOTAL: &'static str = "rbridge_monitor_scanned_total";
    /// Transactions handed to subscription callbacks.
    pub const MONITOR_MATCHES_TOTAL: &'static str = "rbridge_monitor_matches_total";
    /// Last processed sequence number.
    pub const MONITOR_CURSOR: &'static str = "rbridge_monitor_cursor";

    pub(crate) const OUTCOME_CONFIRMED: &'static str = "confirmed";
    pub(crate) const OUTCOME_REVERTED: &'static str = "reverted";
    pub(crate) const OUTCOME_TIMED_OUT: &'static str = "timed_out";

    /// Describes every metric. Call once after installing a recorder.
    pub fn init() {
        Self::describe();
    }

    fn describe() {
        metrics::describe_counter!(
            Self::CONFIRMATION_POLLS_TOTAL,
            metrics::Unit::Count,
            "Receipt polls issued while waiting for confirmations",
        );
        metrics::describe_counter!(
            Self::CONFIRMATION_OUTCOMES_TOTAL,
            metrics::Unit::Count,
            "Confirmation verdicts by outcome",
        );
        metrics::describe_counter!(
            Self::CONFIRMATION_RPC_ERRORS_TOTAL,
            metrics::Unit::Count,
            "RPC failures retried while waiting for confirmations",
        );
        metrics::describe_histogram!(
            Self::CONFIRMATION_DURATION_SECONDS,
            metrics::Unit::Seconds,
            "Time taken to reach a confirmation verdict",
        );
        metrics::describe_counter!(
            Self::MONITOR_TICKS_TOTAL,
            metrics::Unit::Count,
            "Coordinating ledger monitor ticks",
        );
        metrics::describe_counter!(
            Self::MONITOR_RPC_ERRORS_TOTAL,
            metrics::Unit::Count,
            "RPC failures retried by the coordinating ledger monitor",
        );
        metrics::describe_counter!(
            Self::MONITOR_SCANNED_TOTAL,
            metrics::Unit::Count,
            "Coordinating ledger transactions scanned",
        );
        metrics::describe_counter!(
            Self::MONITOR_MATCHES_TOTAL,
            metrics::Unit::Count,
            "Coordinating ledger transactions dispatched to subscribers",
        );
        metrics::describe_gauge!(
            Self::MONITOR_CURSOR,
            metrics::Unit::Count,
            "Highest coordinating ledger sequence number processed",
        );
    }

    pub(crate) fn zero_waiter(chain_id: ChainId) {
        metrics::counter!(Self::CONFIRMATION_POLLS_TOTAL, "chain_id" => chain_id.to_string())
            .increment(0);
        metrics::counter!(Self::CONFIRMATION_RPC_ERRORS_TOTAL, "chain_id" => chain_id.to_string())
            .increment(0);
        for outcome in [Self::OUTCOME_CONFIRMED, Self::OUTCOME_REVERTED, Self::OUTCOME_TIMED_OUT] {
            metrics::counter!(
                Self::CONFIRMATION_OUTCOMES_TOTAL,
                "chain_id" => chain_id.to_string(),
                "outcome" => outcome,
            )
            .increment(0);
        }
    }

    pub(crate) fn zero_monitor(rvm_id: &str) {
        metrics::counter!(Self::MONITOR_TICKS_TOTAL, "rvm_id" => rvm_id.to_string()).increment(0);
        metrics::counter!(Self::MONITOR_RPC_ERRORS_TOTAL, "rvm_id" => rvm_id.to_string())
            .increment(0);
        metrics::counter!(Self::MONITOR_SCANNED_TOTAL, "rvm_id" => rvm_id.to_string())
            .increment(0);
        metrics::counter!(Self::MONITOR_MATCHES_TOTAL, "rvm_id" => rvm_id.to_string())
            .increment(0);
    }

    pub(crate) fn record_poll(chain_id: ChainId) {
        metrics::counter!(Self::CONFIRMATION_POLLS_TOTAL, "chain_id" => chain_id.to_string())
            .increment(1);
    }

    pub(crate) fn record_waiter_error(chain_id: ChainId) {
        metrics::counter!(Self::CONFIRMATION_RPC_ERRORS_TOTAL, "chain_id" => chain_id.to_string())
            .increment(1);
    }

    pub(crate) fn record_outcome(chain_id: ChainId, outcome: &'static str, seconds: f64) {
        metrics::counter!(
            Self::CONFIRMATION_OUTCOMES_TOTAL,
            "chain_id" => chain_id.to_string(),
            "outcome" => outcome,
        )
        .increment(1);
        metrics::histogram!(
            Self::CONFIRMATION_DURATION_SECONDS,
            "chain_id" => chain_id.to_string(),
            "outcome" => outcome,
        )
        .record(seconds);
    }

    pub(crate) fn record_tick(rvm_id: &str) {
        metrics::counter!(Self::MONITOR_TICKS_TOTAL, "rvm_id" => rvm_id.to_string()).increment(1);
    }

    pub(crate) fn record_monitor_error(rvm_id: &str) {
        metrics::counter!(Self::MONITOR_RPC_ERRORS_TOTAL, "rvm_id" => rvm_id.to_string())
            .increment(1);
    }

    pub(crate) fn record_scanned(rvm_id: &str, scanned: u64, matched: u64, cursor: u64) {
        metrics::counter!(Self::MONITOR_SCANNED_TOTAL, "rvm_id" => rvm_id.to_string())
            .increment(scanned);
        metrics::counter!(Self::MONITOR_MATCHES_TOTAL, "rvm_id" => rvm_id.to_string())
            .increment(matched);
        metrics::gauge!(Self::MONITOR_CURSOR, "rvm_id" => rvm_id.to_string()).set(cursor as f64);
    }
}
