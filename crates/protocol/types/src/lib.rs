#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod chain;
pub use chain::{ChainLog, ChainReceipt, ChainTransaction, TxStatus};

mod reactive;
pub use reactive::{ReactiveLog, ReactiveTransaction};

pub mod sequence;

pub use alloy_primitives::{Address, B256, Bytes, ChainId, U256};
