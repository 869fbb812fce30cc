//! Order lifecycle status derivation.

use alloy_primitives::U256;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order, derived from on-chain fields.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Open for fills.
    #[display("active")]
    Active,
    /// Remaining amount reached zero.
    #[display("filled")]
    Filled,
    /// Deactivated by its owner.
    #[display("cancelled")]
    Cancelled,
    /// Still active with a remaining amount, but past its expiry.
    #[display("expired")]
    Expired,
}

impl OrderStatus {
    /// Returns `true` if no further fills can ever occur.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Derives an order's status from freshly read on-chain fields.
///
/// Cancellation takes precedence over fill state, which takes precedence over expiry. An
/// order whose expiry equals `now` is already expired.
pub fn resolve_status(
    active: bool,
    amount_remaining: U256,
    expires_at: u64,
    now: u64,
) -> OrderStatus {
    if !active {
        OrderStatus::Cancelled
    } else if amount_remaining.is_zero() {
        OrderStatus::Filled
    } else if now >= expires_at {
        OrderStatus::Expired
    } else {
        OrderStatus::Active
    }
}
