//! Fixed-point token amount arithmetic.
//!
//! Amounts are raw integers scaled by the token's decimal count. Every operation here
//! stays in integer arithmetic; products are widened to 512 bits before dividing so that
//! no intermediate can overflow or lose precision.

use crate::AmountError;
use alloy_primitives::{U256, U512, ruint::UintTryFrom};

/// The largest decimal count whose scale factor fits in a [`U256`].
pub const MAX_DECIMALS: u8 = 77;

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Protocol fee charged on fills, in basis points.
pub const PROTOCOL_FEE_BPS: u64 = 20;

/// Returns `10^decimals`.
pub fn scale(decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsTooLarge(decimals));
    }
    Ok(U256::from(10u64).pow(U256::from(decimals)))
}

/// Computes `value * numerator / denominator`, rounding down.
///
/// Returns `None` when `denominator` is zero or the quotient does not fit in a [`U256`].
pub fn mul_div(value: U256, numerator: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let product = U512::from(value) * U512::from(numerator);
    U256::uint_try_from(product / U512::from(denominator)).ok()
}

/// Percentage of the requested amount that has been filled, in `[0, 100]`.
///
/// `((requested - remaining) * 100) / requested`, multiplied before dividing. Returns `0`
/// when nothing was requested. A `remaining` larger than `requested` is treated as
/// nothing filled.
pub fn percent_filled(requested: U256, remaining: U256) -> u8 {
    if requested.is_zero() {
        return 0;
    }
    let filled = requested.saturating_sub(remaining);
    mul_div(filled, U256::from(100u64), requested).map_or(0, |percent| percent.saturating_to())
}

/// Applies a basis-point rate to `amount`, rounding down. Saturates at [`U256::MAX`].
pub fn apply_bps(amount: U256, bps: u64) -> U256 {
    mul_div(amount, U256::from(bps), U256::from(BPS_DENOMINATOR)).unwrap_or(U256::MAX)
}

/// Parses a human-readable decimal string such as `"1.5"` into a raw amount with
/// `decimals` fractional digits.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, AmountError> {
    let factor = scale(decimals)?;
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Malformed(value.to_string()));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(AmountError::Malformed(value.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals { value: value.to_string(), decimals });
    }

    let whole = if whole.is_empty() { U256::ZERO } else { parse_digits(whole, value)? };
    let fraction = if fraction.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{fraction:0<width$}", width = decimals as usize);
        parse_digits(&padded, value)?
    };

    whole
        .checked_mul(factor)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(|| AmountError::Overflow(value.to_string()))
}

fn parse_digits(digits: &str, original: &str) -> Result<U256, AmountError> {
    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow(original.to_string()))
}

/// Formats a raw amount as a decimal string with trailing fractional zeros removed.
pub fn format_units(amount: U256, decimals: u8) -> Result<String, AmountError> {
    let factor = scale(decimals)?;
    let whole = amount / factor;
    let fraction = amount % factor;
    if fraction.is_zero() {
        return Ok(whole.to_string());
    }
    let fraction = format!("{fraction:0>width$}", width = decimals as usize);
    Ok(format!("{whole}.{}", fraction.trim_end_matches('0')))
}

/// Formats a raw amount with exactly `precision` fractional digits, truncating the rest.
pub fn format_units_truncated(
    amount: U256,
    decimals: u8,
    precision: u8,
) -> Result<String, AmountError> {
    let factor = scale(decimals)?;
    let whole = amount / factor;
    if precision == 0 {
        return Ok(whole.to_string());
    }
    let fraction = format!("{:0>width$}", amount % factor, width = decimals as usize);
    let shown: String =
        fraction.chars().chain(core::iter::repeat('0')).take(precision as usize).collect();
    Ok(format!("{whole}.{shown}"))
}

/// The display precision used for a token with `decimals` decimals.
pub const fn display_precision(decimals: u8) -> u8 {
    if decimals == 6 { 2 } else { 4 }
}
