#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod client;
pub use client::{DEFAULT_RPC_TIMEOUT, RpcClient};

mod error;
pub use error::RpcError;

mod origin;
pub use origin::{OriginChainClient, OriginChainReader};

mod reactive;
pub use reactive::{ReactiveLedgerClient, ReactiveLedgerReader};
