//! Origin and destination chain reader.

use crate::{RpcClient, RpcError};
use alloy_primitives::{Address, B256, Bytes, ChainId, U64, U256};
use async_trait::async_trait;
use rbridge_settlement::ChainRegistry;
use rbridge_types::{ChainLog, ChainReceipt, ChainTransaction, TxStatus};
use serde::Deserialize;
use std::{collections::HashMap, fmt::Debug, time::Duration};
use tracing::trace;

/// Typed reads against origin and destination chains.
///
/// A transaction or receipt the node has not seen yet is `Ok(None)`.
#[async_trait]
pub trait OriginChainReader: Send + Sync + Debug {
    /// Looks up a transaction by hash. The returned status is always
    /// [`TxStatus::Pending`]; combine with [`Self::receipt`] for the outcome.
    async fn transaction(
        &self,
        chain_id: ChainId,
        hash: B256,
    ) -> Result<Option<ChainTransaction>, RpcError>;

    /// Looks up the receipt of a mined transaction.
    async fn receipt(
        &self,
        chain_id: ChainId,
        hash: B256,
    ) -> Result<Option<ChainReceipt>, RpcError>;

    /// The chain's latest block number.
    async fn block_number(&self, chain_id: ChainId) -> Result<u64, RpcError>;

    /// Returns `true` if reads against `chain_id` can be served.
    fn supports_chain(&self, chain_id: ChainId) -> bool;
}

/// [`OriginChainReader`] over one [`RpcClient`] per chain.
#[derive(Debug, Clone, Default)]
pub struct OriginChainClient {
    clients: HashMap<ChainId, RpcClient>,
}

impl OriginChainClient {
    /// A reader with no chains configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects to every chain in the registry.
    pub fn from_registry(registry: &ChainRegistry, timeout: Duration) -> Result<Self, RpcError> {
        let mut reader = Self::new();
        for chain in registry.chains() {
            reader.clients.insert(chain.id, RpcClient::http(&chain.rpc_url, timeout)?);
        }
        Ok(reader)
    }

    /// Adds or replaces the client for a chain.
    pub fn with_chain(mut self, chain_id: ChainId, client: RpcClient) -> Self {
        self.clients.insert(chain_id, client);
        self
    }

    fn client(&self, chain_id: ChainId) -> Result<&RpcClient, RpcError> {
        self.clients.get(&chain_id).ok_or(RpcError::UnsupportedChain(chain_id))
    }
}

#[async_trait]
impl OriginChainReader for OriginChainClient {
    async fn transaction(
        &self,
        chain_id: ChainId,
        hash: B256,
    ) -> Result<Option<ChainTransaction>, RpcError> {
        let tx: Option<WireTransaction> =
            self.client(chain_id)?.call("eth_getTransactionByHash", (hash,)).await?;
        if tx.is_none() {
            trace!(target: "rpc::origin", chain_id, %hash, "Transaction not found");
        }
        Ok(tx.map(Into::into))
    }

    async fn receipt(
        &self,
        chain_id: ChainId,
        hash: B256,
    ) -> Result<Option<ChainReceipt>, RpcError> {
        let receipt: Option<WireReceipt> =
            self.client(chain_id)?.call("eth_getTransactionReceipt", (hash,)).await?;
        let Some(receipt) = receipt else {
            trace!(target: "rpc::origin", chain_id, %hash, "Receipt not available yet");
            return Ok(None);
        };
        ChainReceipt::try_from(receipt).map(Some)
    }

    async fn block_number(&self, chain_id: ChainId) -> Result<u64, RpcError> {
        let number: U64 = self.client(chain_id)?.call("eth_blockNumber", ()).await?;
        Ok(number.to())
    }

    fn supports_chain(&self, chain_id: ChainId) -> bool {
        self.clients.contains_key(&chain_id)
    }
}

/// `eth_getTransactionByHash` result. Only the fields the tracker reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTransaction {
    hash: B256,
    #[serde(default, with = "alloy_serde::quantity::opt")]
    block_number: Option<u64>,
    from: Address,
    #[serde(default)]
    to: Option<Address>,
    value: U256,
}

impl From<WireTransaction> for ChainTransaction {
    fn from(tx: WireTransaction) -> Self {
        Self {
            hash: tx.hash,
            block_number: tx.block_number,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            status: TxStatus::Pending,
        }
    }
}

/// `eth_getTransactionReceipt` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReceipt {
    transaction_hash: B256,
    #[serde(with = "alloy_serde::quantity")]
    block_number: u64,
    #[serde(with = "alloy_serde::quantity")]
    status: u64,
    #[serde(default)]
    logs: Vec<WireLog>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    #[serde(with = "alloy_serde::quantity")]
    block_number: u64,
    transaction_hash: B256,
    #[serde(with = "alloy_serde::quantity")]
    log_index: u64,
}

impl TryFrom<WireReceipt> for ChainReceipt {
    type Error = RpcError;

    fn try_from(receipt: WireReceipt) -> Result<Self, Self::Error> {
        let logs = receipt
            .logs
            .into_iter()
            .map(|log| ChainLog {
                address: log.address,
                topics: log.topics,
                data: log.data,
                block_number: log.block_number,
                transaction_hash: log.transaction_hash,
                log_index: log.log_index,
            })
            .collect();
        Self::new(receipt.transaction_hash, receipt.block_number, receipt.status, logs).map_err(
            |(prev, next)| {
                RpcError::InvalidResponse(format!(
                    "receipt {} has log index {next} after {prev}",
                    receipt.transaction_hash
                ))
            },
        )
    }
}
