use alloy_primitives::ChainId;
use rbridge_rpc::RpcError;
use thiserror::Error;

/// Errors that end a confirmation wait without a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    /// The reader has no endpoint for the chain.
    #[error("unsupported chain {0}")]
    UnsupportedChain(ChainId),

    /// The wait was cancelled.
    #[error("wait cancelled")]
    Cancelled,

    /// A read failed in a way retrying cannot fix.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Errors raised when starting a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The monitor is already polling.
    #[error("monitor is already running")]
    AlreadyRunning,

    /// The subscription names no execution environment.
    #[error("subscription has no rvm id")]
    MissingRvmId,

    /// The configuration cannot drive a poll loop.
    #[error("invalid monitor config: {0}")]
    InvalidConfig(&'static str),
}
