//! The order (bid) model and its validation rules.

use crate::{
    OrderError, OrderStatus,
    amount::{PROTOCOL_FEE_BPS, apply_bps, mul_div, percent_filled},
    status::resolve_status,
};
use alloy_primitives::{Address, B256, ChainId, U256};
use serde::{Deserialize, Serialize};

/// Shortest accepted order lifetime, in seconds.
pub const MIN_ORDER_DURATION: u64 = 60;
/// Longest accepted order lifetime, in seconds.
pub const MAX_ORDER_DURATION: u64 = 86_400;
/// Largest accepted slippage tolerance, in basis points.
pub const MAX_SLIPPAGE_BPS: u64 = 10_000;
/// Largest accepted filler premium, in basis points.
pub const MAX_PREMIUM_BPS: u64 = 1_000;

/// A deposit commitment awaiting counterparty fills.
///
/// Every field mirrors on-chain state at the time it was read. The remaining amounts and
/// the active flag change only through on-chain transactions, so an [`Order`] is a
/// snapshot and must be re-read before each status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier.
    pub id: U256,
    /// Address that placed the order.
    pub owner: Address,
    /// Chain the deposit was made on.
    pub origin_chain_id: ChainId,
    /// Chain the requested token is paid out on.
    pub destination_chain_id: ChainId,
    /// Token deposited on the origin chain.
    pub token_deposited: Address,
    /// Token requested on the destination chain.
    pub token_requested: Address,
    /// Deposited amount.
    pub amount_deposited: U256,
    /// Requested amount.
    pub amount_requested: U256,
    /// Deposited amount not yet released to fillers.
    pub amount_deposited_remaining: U256,
    /// Requested amount not yet filled.
    pub amount_requested_remaining: U256,
    /// Smallest accepted partial fill.
    pub min_fill_amount: U256,
    /// `false` once the owner cancelled.
    pub active: bool,
    /// Creation time, unix seconds.
    pub created_at: u64,
    /// Expiry time, unix seconds.
    pub expires_at: u64,
    /// Slippage tolerance, in basis points.
    pub slippage_bps: u64,
    /// Whether the requested amount tracks a price feed.
    pub use_price_feed: bool,
    /// Premium paid to fillers, in basis points.
    pub premium_bps: u64,
    /// Protocol fee, in basis points.
    pub protocol_fee_bps: u64,
    /// Deposit transaction on the origin chain.
    pub tx_hash: B256,
}

impl Order {
    /// Lifecycle status at `now`.
    pub fn status(&self, now: u64) -> OrderStatus {
        resolve_status(self.active, self.amount_requested_remaining, self.expires_at, now)
    }

    /// Percentage of the requested amount filled so far.
    pub fn percent_filled(&self) -> u8 {
        percent_filled(self.amount_requested, self.amount_requested_remaining)
    }

    /// Validates a fill of `amount` at time `now` and returns the amount that would be
    /// filled.
    ///
    /// With `fill_remaining` set the fill takes whatever is left and `amount` is ignored.
    /// A partial fill must be at least the minimum fill, unless it drains the order.
    pub fn check_fill(
        &self,
        amount: U256,
        fill_remaining: bool,
        now: u64,
    ) -> Result<U256, OrderError> {
        let status = self.status(now);
        if status != OrderStatus::Active {
            return Err(OrderError::NotFillable(status));
        }

        let remaining = self.amount_requested_remaining;
        if fill_remaining {
            return Ok(remaining);
        }
        if amount.is_zero() {
            return Err(OrderError::ZeroAmount("fill amount"));
        }
        if amount > remaining {
            return Err(OrderError::ExceedsRemaining { amount, remaining });
        }
        if amount < self.min_fill_amount && amount != remaining {
            return Err(OrderError::BelowMinFill { amount, min_fill: self.min_fill_amount });
        }
        Ok(amount)
    }

    /// Deposited tokens released to a filler who pays `fill_amount` of the requested token.
    pub fn deposit_released(&self, fill_amount: U256) -> U256 {
        mul_div(fill_amount, self.amount_deposited, self.amount_requested).unwrap_or_default()
    }

    /// Premium earned by a filler paying `fill_amount`.
    pub fn filler_premium(&self, fill_amount: U256) -> U256 {
        apply_bps(fill_amount, self.premium_bps)
    }

    /// Protocol fee charged on a fill of `fill_amount`.
    pub fn protocol_fee(&self, fill_amount: U256) -> U256 {
        apply_bps(fill_amount, self.protocol_fee_bps)
    }
}

/// Parameters of an order a user is about to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Chain the deposit is made on.
    pub origin_chain_id: ChainId,
    /// Chain the requested token is paid out on.
    pub destination_chain_id: ChainId,
    /// Token to deposit.
    pub token_deposited: Address,
    /// Token to receive.
    pub token_requested: Address,
    /// Amount to deposit.
    pub amount_deposited: U256,
    /// Amount to receive.
    pub amount_requested: U256,
    /// Smallest accepted partial fill.
    pub min_fill_amount: U256,
    /// Lifetime, in seconds.
    pub duration: u64,
    /// Slippage tolerance, in basis points.
    pub slippage_bps: u64,
    /// Whether the requested amount tracks a price feed.
    pub use_price_feed: bool,
    /// Premium offered to fillers, in basis points.
    pub premium_bps: u64,
}

impl PlaceOrderRequest {
    /// Checks the request against the placement rules.
    pub fn validate(&self) -> Result<(), OrderError> {
        if !(MIN_ORDER_DURATION..=MAX_ORDER_DURATION).contains(&self.duration) {
            return Err(OrderError::InvalidDuration(self.duration));
        }
        if self.slippage_bps > MAX_SLIPPAGE_BPS {
            return Err(OrderError::InvalidSlippage(self.slippage_bps));
        }
        if self.premium_bps > MAX_PREMIUM_BPS {
            return Err(OrderError::InvalidPremium(self.premium_bps));
        }
        if self.origin_chain_id == self.destination_chain_id {
            return Err(OrderError::SameChain(self.origin_chain_id));
        }
        if self.amount_deposited.is_zero() {
            return Err(OrderError::ZeroAmount("amount deposited"));
        }
        if self.amount_requested.is_zero() {
            return Err(OrderError::ZeroAmount("amount requested"));
        }
        if self.min_fill_amount.is_zero() {
            return Err(OrderError::ZeroAmount("minimum fill"));
        }
        if self.min_fill_amount > self.amount_requested {
            return Err(OrderError::MinFillExceedsRequested {
                min_fill: self.min_fill_amount,
                requested: self.amount_requested,
            });
        }
        Ok(())
    }

    /// The order this request would create once its deposit is mined at `created_at`.
    pub fn into_order(self, id: U256, owner: Address, created_at: u64, tx_hash: B256) -> Order {
        Order {
            id,
            owner,
            origin_chain_id: self.origin_chain_id,
            destination_chain_id: self.destination_chain_id,
            token_deposited: self.token_deposited,
            token_requested: self.token_requested,
            amount_deposited: self.amount_deposited,
            amount_requested: self.amount_requested,
            amount_deposited_remaining: self.amount_deposited,
            amount_requested_remaining: self.amount_requested,
            min_fill_amount: self.min_fill_amount,
            active: true,
            created_at,
            expires_at: created_at.saturating_add(self.duration),
            slippage_bps: self.slippage_bps,
            use_price_feed: self.use_price_feed,
            premium_bps: self.premium_bps,
            protocol_fee_bps: PROTOCOL_FEE_BPS,
            tx_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use rstest::{fixture, rstest};

    const NOW: u64 = 1_735_689_600;

    #[fixture]
    fn request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            origin_chain_id: 11155111,
            destination_chain_id: 84532,
            token_deposited: address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
            token_requested: address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
            amount_deposited: U256::from(1_000_000_000u64),
            amount_requested: U256::from(990_000_000u64),
            min_fill_amount: U256::from(100_000_000u64),
            duration: 3_600,
            slippage_bps: 50,
            use_price_feed: false,
            premium_bps: 100,
        }
    }

    #[fixture]
    fn order(request: PlaceOrderRequest) -> Order {
        request.into_order(U256::from(7), Address::ZERO, NOW, B256::ZERO)
    }

    #[rstest]
    fn test_valid_request(request: PlaceOrderRequest) {
        assert_eq!(request.validate(), Ok(()));
    }

    #[rstest]
    #[case::too_short(|r: &mut PlaceOrderRequest| r.duration = 59, OrderError::InvalidDuration(59))]
    #[case::too_long(|r: &mut PlaceOrderRequest| r.duration = 86_401, OrderError::InvalidDuration(86_401))]
    #[case::slippage(|r: &mut PlaceOrderRequest| r.slippage_bps = 10_001, OrderError::InvalidSlippage(10_001))]
    #[case::premium(|r: &mut PlaceOrderRequest| r.premium_bps = 1_001, OrderError::InvalidPremium(1_001))]
    #[case::same_chain(|r: &mut PlaceOrderRequest| r.destination_chain_id = 11155111, OrderError::SameChain(11155111))]
    #[case::zero_deposit(|r: &mut PlaceOrderRequest| r.amount_deposited = U256::ZERO, OrderError::ZeroAmount("amount deposited"))]
    #[case::zero_min_fill(|r: &mut PlaceOrderRequest| r.min_fill_amount = U256::ZERO, OrderError::ZeroAmount("minimum fill"))]
    fn test_invalid_request(
        mut request: PlaceOrderRequest,
        #[case] mutate: fn(&mut PlaceOrderRequest),
        #[case] expected: OrderError,
    ) {
        mutate(&mut request);
        assert_eq!(request.validate(), Err(expected));
    }

    #[rstest]
    fn test_min_fill_above_requested(mut request: PlaceOrderRequest) {
        request.min_fill_amount = request.amount_requested + U256::from(1);
        assert!(matches!(request.validate(), Err(OrderError::MinFillExceedsRequested { .. })));
    }

    #[rstest]
    fn test_boundaries_accepted(mut request: PlaceOrderRequest) {
        request.duration = MIN_ORDER_DURATION;
        request.slippage_bps = MAX_SLIPPAGE_BPS;
        request.premium_bps = MAX_PREMIUM_BPS;
        request.min_fill_amount = request.amount_requested;
        assert_eq!(request.validate(), Ok(()));
    }

    #[rstest]
    fn test_new_order_is_active(order: Order) {
        assert_eq!(order.status(NOW), OrderStatus::Active);
        assert_eq!(order.expires_at, NOW + 3_600);
        assert_eq!(order.status(NOW + 3_600), OrderStatus::Expired);
        assert_eq!(order.percent_filled(), 0);
    }

    #[rstest]
    fn test_check_fill(mut order: Order) {
        let min = order.min_fill_amount;
        assert_eq!(order.check_fill(min, false, NOW), Ok(min));
        assert_eq!(
            order.check_fill(min - U256::from(1), false, NOW),
            Err(OrderError::BelowMinFill { amount: min - U256::from(1), min_fill: min })
        );
        assert!(matches!(
            order.check_fill(order.amount_requested + U256::from(1), false, NOW),
            Err(OrderError::ExceedsRemaining { .. })
        ));
        assert_eq!(order.check_fill(U256::ZERO, true, NOW), Ok(order.amount_requested));

        // A tail smaller than the minimum fill can still be taken whole.
        order.amount_requested_remaining = U256::from(5);
        assert_eq!(order.check_fill(U256::from(5), false, NOW), Ok(U256::from(5)));
        assert_eq!(order.percent_filled(), 99);
    }

    #[rstest]
    fn test_check_fill_rejects_closed_orders(mut order: Order) {
        assert_eq!(
            order.check_fill(order.min_fill_amount, false, NOW + 3_600),
            Err(OrderError::NotFillable(OrderStatus::Expired))
        );
        order.active = false;
        assert_eq!(
            order.check_fill(order.min_fill_amount, true, NOW),
            Err(OrderError::NotFillable(OrderStatus::Cancelled))
        );
    }

    #[rstest]
    fn test_fill_economics(order: Order) {
        let fill = U256::from(99_000_000u64);
        assert_eq!(order.deposit_released(fill), U256::from(100_000_000u64));
        assert_eq!(order.filler_premium(fill), U256::from(990_000u64));
        assert_eq!(order.protocol_fee(fill), U256::from(198_000u64));
    }
}
