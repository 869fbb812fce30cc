//! Origin and destination chain projections.

use alloy_primitives::{Address, B256, Bytes, U256};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Execution status of an origin or destination chain transaction.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Executed and succeeded.
    #[display("success")]
    Success,
    /// Executed and reverted.
    #[display("failed")]
    Failed,
    /// No receipt observed yet.
    #[display("pending")]
    Pending,
}

impl TxStatus {
    /// Derives the status from a receipt status code. Only `1` denotes success.
    pub const fn from_receipt_code(code: u64) -> Self {
        if code == 1 { Self::Success } else { Self::Failed }
    }
}

/// A transaction as seen by an origin or destination chain node.
///
/// Fetched on demand and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransaction {
    /// Transaction hash.
    pub hash: B256,
    /// Block the transaction was included in, if any.
    pub block_number: Option<u64>,
    /// Sender.
    pub from: Address,
    /// Recipient, `None` for contract creation.
    pub to: Option<Address>,
    /// Value transferred, in wei.
    pub value: U256,
    /// Execution status. A transaction read alone is always [`TxStatus::Pending`].
    pub status: TxStatus,
}

impl ChainTransaction {
    /// Returns a copy carrying the execution status reported by `receipt`.
    pub fn with_receipt(&self, receipt: &ChainReceipt) -> Self {
        Self { status: receipt.status, block_number: Some(receipt.block_number), ..self.clone() }
    }

    /// Returns `true` once the transaction is in a block.
    pub const fn is_mined(&self) -> bool {
        self.block_number.is_some()
    }
}

/// An event log emitted during a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLog {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics, event signature first.
    pub topics: Vec<B256>,
    /// Opaque non-indexed payload.
    pub data: Bytes,
    /// Block the log was emitted in.
    pub block_number: u64,
    /// Transaction that emitted the log.
    pub transaction_hash: B256,
    /// Position of the log within the block.
    pub log_index: u64,
}

/// The outcome of a mined transaction.
///
/// Log indices are unique and strictly increasing; [`ChainReceipt::new`] enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReceipt {
    /// Hash of the transaction this receipt belongs to.
    pub transaction_hash: B256,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Either [`TxStatus::Success`] or [`TxStatus::Failed`].
    pub status: TxStatus,
    /// Emitted logs, in log-index order.
    pub logs: Vec<ChainLog>,
}

impl ChainReceipt {
    /// Builds a receipt, returning the offending pair of indices if the logs are not in
    /// strictly increasing log-index order.
    pub fn new(
        transaction_hash: B256,
        block_number: u64,
        status_code: u64,
        logs: Vec<ChainLog>,
    ) -> Result<Self, (u64, u64)> {
        if let Some(pair) = logs.windows(2).find(|pair| pair[0].log_index >= pair[1].log_index) {
            return Err((pair[0].log_index, pair[1].log_index));
        }
        Ok(Self {
            transaction_hash,
            block_number,
            status: TxStatus::from_receipt_code(status_code),
            logs,
        })
    }

    /// Returns `true` if the transaction succeeded.
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    /// Returns the logs emitted by `address`.
    pub fn logs_from(&self, address: Address) -> impl Iterator<Item = &ChainLog> {
        self.logs.iter().filter(move |log| log.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    fn log(index: u64, emitter: Address) -> ChainLog {
        ChainLog {
            address: emitter,
            topics: vec![],
            data: Bytes::new(),
            block_number: 7,
            transaction_hash: B256::ZERO,
            log_index: index,
        }
    }

    #[test]
    fn test_receipt_status_code() {
        assert_eq!(TxStatus::from_receipt_code(1), TxStatus::Success);
        assert_eq!(TxStatus::from_receipt_code(0), TxStatus::Failed);
        assert_eq!(TxStatus::from_receipt_code(2), TxStatus::Failed);
    }

    #[test]
    fn test_receipt_rejects_unordered_logs() {
        let emitter = Address::ZERO;
        let err = ChainReceipt::new(B256::ZERO, 7, 1, vec![log(3, emitter), log(3, emitter)])
            .unwrap_err();
        assert_eq!(err, (3, 3));

        let err = ChainReceipt::new(B256::ZERO, 7, 1, vec![log(4, emitter), log(2, emitter)])
            .unwrap_err();
        assert_eq!(err, (4, 2));
    }

    #[test]
    fn test_logs_from_filters_emitter() {
        let bridge = address!("0xBC3B38142f60D4A3FbE23B70B4723FB0284161d1");
        let receipt = ChainReceipt::new(
            B256::ZERO,
            7,
            1,
            vec![log(0, Address::ZERO), log(1, bridge), log(5, bridge)],
        )
        .unwrap();
        let indices: Vec<_> = receipt.logs_from(bridge).map(|l| l.log_index).collect();
        assert_eq!(indices, vec![1, 5]);
        assert!(receipt.is_success());
    }

    #[test]
    fn test_with_receipt_promotes_pending() {
        let hash = b256!("0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890");
        let tx = ChainTransaction {
            hash,
            block_number: None,
            from: Address::ZERO,
            to: None,
            value: U256::from(5),
            status: TxStatus::Pending,
        };
        assert!(!tx.is_mined());

        let receipt = ChainReceipt::new(hash, 99, 0, vec![]).unwrap();
        let merged = tx.with_receipt(&receipt);
        assert_eq!(merged.status, TxStatus::Failed);
        assert_eq!(merged.block_number, Some(99));
        assert_eq!(merged.value, tx.value);
    }
}
