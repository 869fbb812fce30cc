//! Coordinating (reactive) ledger projections.

use crate::sequence;
use alloy_primitives::{Address, B256, Bytes, ChainId};
use serde::{Deserialize, Serialize};

/// A transaction executed on the coordinating ledger.
///
/// The `origin_*` fields cross-reference the origin-chain event that triggered this
/// transaction; they are what correlates a relay back to a locally known action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveTransaction {
    /// Transaction hash.
    pub hash: B256,
    /// Sequence number, monotonically increasing per ledger. Used as the monitor cursor.
    #[serde(with = "sequence")]
    pub number: u64,
    /// Execution time, unix seconds.
    #[serde(with = "sequence")]
    pub time: u64,
    /// State root after execution.
    pub root: B256,
    /// Gas limit.
    #[serde(rename = "limit", with = "sequence")]
    pub gas_limit: u64,
    /// Gas used.
    #[serde(rename = "used", with = "sequence")]
    pub gas_used: u64,
    /// Transaction type.
    #[serde(rename = "type", with = "sequence", default)]
    pub tx_type: u64,
    /// Status code, `1` on success.
    #[serde(with = "sequence")]
    pub status: u64,
    /// Sender.
    pub from: Address,
    /// Recipient, `None` for contract creation.
    #[serde(default)]
    pub to: Option<Address>,
    /// Whether this transaction created a contract.
    #[serde(default)]
    pub create_contract: bool,
    /// Session the transaction was executed in.
    #[serde(with = "sequence")]
    pub session_id: u64,
    /// Chain id of the origin-chain event that triggered this transaction.
    #[serde(rename = "refChainId", with = "sequence")]
    pub origin_chain_id: ChainId,
    /// Hash of the origin-chain transaction that triggered this transaction.
    #[serde(rename = "refTx")]
    pub origin_tx_hash: B256,
    /// Log index of the triggering event within the origin transaction.
    #[serde(rename = "refEventIndex", with = "sequence")]
    pub origin_event_index: u64,
    /// Call data.
    #[serde(default)]
    pub data: Bytes,
    /// Return data.
    #[serde(rename = "rData", default)]
    pub return_data: Bytes,
}

impl ReactiveTransaction {
    /// Returns `true` if the transaction executed successfully.
    pub const fn is_success(&self) -> bool {
        self.status == 1
    }

    /// Returns `true` if this transaction was triggered by the given origin transaction.
    pub fn relays(&self, origin_chain_id: ChainId, origin_tx_hash: B256) -> bool {
        self.origin_chain_id == origin_chain_id && self.origin_tx_hash == origin_tx_hash
    }
}

/// An event log emitted by a coordinating-ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveLog {
    /// Emitting transaction.
    pub tx_hash: B256,
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<B256>,
    /// Opaque payload.
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    const REACTIVE_TX: &str = r#"
    {
        "hash": "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
        "number": "1043",
        "time": 1735689600,
        "root": "0x567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234",
        "limit": 900000,
        "used": 47429,
        "type": 2,
        "status": 1,
        "from": "0x0000000000000000000000000000000000ffffff",
        "to": "0xBC3B38142f60D4A3FbE23B70B4723FB0284161d1",
        "createContract": false,
        "sessionId": 311,
        "refChainId": 11155111,
        "refTx": "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890",
        "refEventIndex": 3,
        "data": "0xdeadbeef",
        "rData": "0x"
    }"#;

    #[test]
    fn test_deserialize_reactive_transaction() {
        let tx: ReactiveTransaction = serde_json::from_str(REACTIVE_TX).unwrap();
        assert_eq!(tx.number, 1043);
        assert_eq!(tx.time, 1_735_689_600);
        assert_eq!(tx.gas_used, 47429);
        assert_eq!(tx.session_id, 311);
        assert_eq!(tx.to, Some(address!("0xBC3B38142f60D4A3FbE23B70B4723FB0284161d1")));
        assert_eq!(tx.origin_event_index, 3);
        assert!(tx.is_success());
        assert!(tx.relays(
            11155111,
            b256!("0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890")
        ));
        assert!(!tx.relays(84532, tx.origin_tx_hash));
        assert_eq!(tx.data, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
        assert!(tx.return_data.is_empty());
    }

    #[test]
    fn test_serialize_number_as_decimal_string() {
        let tx: ReactiveTransaction = serde_json::from_str(REACTIVE_TX).unwrap();
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["number"], "1043");
        assert_eq!(value["refChainId"], "11155111");
    }

    #[test]
    fn test_missing_recipient_is_contract_creation() {
        let mut value: serde_json::Value = serde_json::from_str(REACTIVE_TX).unwrap();
        value.as_object_mut().unwrap().remove("to");
        value["createContract"] = true.into();
        let tx: ReactiveTransaction = serde_json::from_value(value).unwrap();
        assert_eq!(tx.to, None);
        assert!(tx.create_contract);
    }
}
