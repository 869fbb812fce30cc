//! Coordinating ledger reader over the `rnk_*` JSON-RPC namespace.

use crate::{RpcClient, RpcError};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use derive_more::Constructor;
use rbridge_types::{ReactiveLog, ReactiveTransaction, sequence};
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, trace};

/// Typed reads against the coordinating ledger.
///
/// Every method is scoped to an execution environment (`rvm_id`) except
/// [`Self::address_mapping`]. Sequence numbers travel as base-10 strings.
#[async_trait]
pub trait ReactiveLedgerReader: Send + Sync + Debug {
    /// Looks up a transaction by hash.
    async fn transaction_by_hash(
        &self,
        rvm_id: &str,
        hash: B256,
    ) -> Result<Option<ReactiveTransaction>, RpcError>;

    /// Looks up a transaction by sequence number.
    async fn transaction_by_number(
        &self,
        rvm_id: &str,
        number: u64,
    ) -> Result<Option<ReactiveTransaction>, RpcError>;

    /// Logs emitted by the transaction with the given sequence number.
    async fn transaction_logs(
        &self,
        rvm_id: &str,
        number: u64,
    ) -> Result<Vec<ReactiveLog>, RpcError>;

    /// The highest sequence number executed so far.
    async fn head_number(&self, rvm_id: &str) -> Result<u64, RpcError>;

    /// Up to `limit` transactions starting at sequence number `from`, ascending and without
    /// repeats.
    async fn transactions(
        &self,
        rvm_id: &str,
        from: u64,
        limit: u64,
    ) -> Result<Vec<ReactiveTransaction>, RpcError>;

    /// Maps a contract address to its counterpart on the coordinating ledger.
    async fn address_mapping(&self, address: Address) -> Result<Address, RpcError>;
}

/// [`ReactiveLedgerReader`] over a single [`RpcClient`].
#[derive(Debug, Clone, Constructor)]
pub struct ReactiveLedgerClient {
    client: RpcClient,
}

/// A sequence number as returned by `rnk_getHeadNumber`.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct Sequence(#[serde(with = "sequence")] u64);

#[async_trait]
impl ReactiveLedgerReader for ReactiveLedgerClient {
    async fn transaction_by_hash(
        &self,
        rvm_id: &str,
        hash: B256,
    ) -> Result<Option<ReactiveTransaction>, RpcError> {
        self.client.call("rnk_getTransactionByHash", (rvm_id, hash)).await
    }

    async fn transaction_by_number(
        &self,
        rvm_id: &str,
        number: u64,
    ) -> Result<Option<ReactiveTransaction>, RpcError> {
        self.client.call("rnk_getTransactionByNumber", (rvm_id, number.to_string())).await
    }

    async fn transaction_logs(
        &self,
        rvm_id: &str,
        number: u64,
    ) -> Result<Vec<ReactiveLog>, RpcError> {
        let logs: Option<Vec<ReactiveLog>> =
            self.client.call("rnk_getTransactionLogs", (rvm_id, number.to_string())).await?;
        Ok(logs.unwrap_or_default())
    }

    async fn head_number(&self, rvm_id: &str) -> Result<u64, RpcError> {
        let Sequence(head) = self.client.call("rnk_getHeadNumber", (rvm_id,)).await?;
        trace!(target: "rpc::reactive", rvm_id, head, "Fetched head number");
        Ok(head)
    }

    async fn transactions(
        &self,
        rvm_id: &str,
        from: u64,
        limit: u64,
    ) -> Result<Vec<ReactiveTransaction>, RpcError> {
        let params = (rvm_id, from.to_string(), limit.to_string());
        let batch: Option<Vec<ReactiveTransaction>> =
            self.client.call("rnk_getTransactions", params).await?;
        let mut batch = batch.unwrap_or_default();

        // Nodes may repeat entries across page boundaries.
        let returned = batch.len();
        batch.retain(|tx| tx.number >= from);
        batch.sort_by_key(|tx| tx.number);
        batch.dedup_by_key(|tx| tx.number);
        if batch.len() < returned {
            debug!(
                target: "rpc::reactive",
                rvm_id,
                from,
                dropped = returned - batch.len(),
                "Dropped overlapping batch entries"
            );
        }
        trace!(target: "rpc::reactive", rvm_id, from, limit, len = batch.len(), "Fetched batch");
        Ok(batch)
    }

    async fn address_mapping(&self, address: Address) -> Result<Address, RpcError> {
        self.client.call("rnk_getRnkAddressMapping", (address,)).await
    }
}
