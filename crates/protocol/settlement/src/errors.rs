//! Error types for the settlement primitives.

use alloy_primitives::{Address, ChainId, U256};
use thiserror::Error;

/// Errors raised while parsing or scaling token amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The input is not a plain decimal number.
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    /// The input carries more fractional digits than the token supports.
    #[error("amount {value:?} has more than {decimals} decimals")]
    TooManyDecimals {
        /// The rejected input.
        value: String,
        /// Decimal count of the token.
        decimals: u8,
    },

    /// The decimal count is too large for a 256-bit scale factor.
    #[error("decimal count {0} is out of range")]
    DecimalsTooLarge(u8),

    /// The scaled amount does not fit in 256 bits.
    #[error("amount {0:?} overflows")]
    Overflow(String),
}

/// Errors raised by order placement and fill validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Order duration outside the accepted window.
    #[error("duration {0}s is outside [{min}, {max}]", min = crate::MIN_ORDER_DURATION, max = crate::MAX_ORDER_DURATION)]
    InvalidDuration(u64),

    /// Slippage tolerance above 100%.
    #[error("slippage {0} bps exceeds {max}", max = crate::MAX_SLIPPAGE_BPS)]
    InvalidSlippage(u64),

    /// Premium above the accepted maximum.
    #[error("premium {0} bps exceeds {max}", max = crate::MAX_PREMIUM_BPS)]
    InvalidPremium(u64),

    /// A required amount is zero.
    #[error("{0} must be non-zero")]
    ZeroAmount(&'static str),

    /// Minimum fill larger than the requested amount.
    #[error("minimum fill {min_fill} exceeds requested amount {requested}")]
    MinFillExceedsRequested {
        /// Minimum fill amount.
        min_fill: U256,
        /// Requested amount.
        requested: U256,
    },

    /// Origin and destination are the same chain.
    #[error("origin and destination chain are both {0}")]
    SameChain(ChainId),

    /// The order is not open for fills.
    #[error("order is {0}")]
    NotFillable(crate::OrderStatus),

    /// Fill amount below the order's minimum fill.
    #[error("fill of {amount} is below the minimum fill {min_fill}")]
    BelowMinFill {
        /// Attempted fill amount.
        amount: U256,
        /// Minimum fill amount.
        min_fill: U256,
    },

    /// Fill amount above the order's remaining requested amount.
    #[error("fill of {amount} exceeds remaining {remaining}")]
    ExceedsRemaining {
        /// Attempted fill amount.
        amount: U256,
        /// Remaining requested amount.
        remaining: U256,
    },
}

/// Errors raised while updating a settlement timeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// No step with this index exists.
    #[error("unknown step {0}")]
    UnknownStep(usize),

    /// The step has already been resolved.
    #[error("step {0} is already resolved")]
    AlreadyResolved(usize),
}

/// Errors raised while loading or querying the chain registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry document is not valid JSON or does not match the schema.
    #[error("invalid registry: {0}")]
    Parse(#[from] serde_json::Error),

    /// A chain is registered twice.
    #[error("chain {0} is registered twice")]
    DuplicateChain(ChainId),

    /// A token list refers to a chain that is not registered.
    #[error("token {token} refers to unknown chain {chain_id}")]
    UnknownTokenChain {
        /// Chain the token list was keyed under.
        chain_id: ChainId,
        /// Offending token.
        token: Address,
    },
}
