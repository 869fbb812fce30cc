//! Error types for ledger RPC access.

use alloy_primitives::ChainId;
use alloy_transport::{TransportError, TransportErrorKind};
use thiserror::Error;

/// Errors returned by [`RpcClient`](crate::RpcClient) and the readers built on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The endpoint could not be reached or the HTTP exchange failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error envelope.
    #[error("rpc error {code}: {message}")]
    Protocol {
        /// Error code reported by the node.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },

    /// The response did not decode into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response decoded but violates a ledger invariant.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No endpoint is configured for the chain.
    #[error("unsupported chain {0}")]
    UnsupportedChain(ChainId),

    /// The endpoint URL is malformed.
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),
}

impl RpcError {
    /// Returns `true` for failures that a polling loop may retry.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Protocol { .. } | Self::Decode(_))
    }
}

impl From<TransportError> for RpcError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ErrorResp(payload) => {
                Self::Protocol { code: payload.code, message: payload.message.into_owned() }
            }
            TransportError::DeserError { err, text } => {
                Self::Decode(format!("{err}: {text}"))
            }
            TransportError::SerError(err) => Self::Decode(err.to_string()),
            TransportError::NullResp => Self::Decode("null response".to_string()),
            TransportError::Transport(kind) => Self::from(kind),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<TransportErrorKind> for RpcError {
    fn from(kind: TransportErrorKind) -> Self {
        Self::Transport(kind.to_string())
    }
}
