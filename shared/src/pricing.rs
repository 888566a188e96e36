//! Pricing helpers shared by the server and the browser draft editor
//!
//! Order arithmetic goes through the checked helpers here so oversized
//! amounts surface as [`AmountOverflow`] instead of a panic.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Markup applied to a landed unit cost to suggest a selling price (40%)
pub const DEFAULT_MARKUP: Decimal = Decimal::from_parts(14, 0, 0, false, 1);

/// Largest price or total the store keeps (`NUMERIC(14, 4)`)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4);

/// Decimal places kept for prices and totals
pub const AMOUNT_SCALE: u32 = 4;

/// Decimal places kept for prorated unit costs
pub const UNIT_COST_SCALE: u32 = 8;

/// Order arithmetic left the decimal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Amount is out of range")]
pub struct AmountOverflow;

/// Round to the nearest whole currency unit, halves going up
pub fn round_half_up(value: Decimal) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    value.round_dp_with_strategy(0, strategy)
}

/// Suggested selling price for a unit cost: `round(cost * 1.4)`
pub fn suggested_selling_price(unit_cost: Decimal) -> Result<Decimal, AmountOverflow> {
    unit_cost
        .checked_mul(DEFAULT_MARKUP)
        .map(round_half_up)
        .ok_or(AmountOverflow)
}

/// Order-level extra costs to distribute across purchase lines
pub fn additional_costs(
    shipping_cost: Decimal,
    additional_fees: Decimal,
    discount: Decimal,
) -> Result<Decimal, AmountOverflow> {
    shipping_cost
        .checked_add(additional_fees)
        .and_then(|sum| sum.checked_sub(discount))
        .ok_or(AmountOverflow)
}

/// `quantity * unit_price`
pub fn line_total(quantity: i32, unit_price: Decimal) -> Result<Decimal, AmountOverflow> {
    Decimal::from(quantity).checked_mul(unit_price).ok_or(AmountOverflow)
}

pub fn checked_sum<I>(amounts: I) -> Result<Decimal, AmountOverflow>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or(AmountOverflow)
}

/// Round a prorated unit cost to the stored precision, halves away from zero
pub fn round_unit_cost(cost: Decimal) -> Decimal {
    cost.round_dp_with_strategy(UNIT_COST_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
