//! Proration of order-level costs across purchase order lines
//!
//! Shipping, fees and discount are spread over the lines in proportion to
//! each line's share of the subtotal. Each line then gets a landed unit cost
//! and a suggested selling price at the default markup.
//!
//! The calculation is a pure function of the current lines and cost fields,
//! so running it twice on unchanged input gives the same result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PurchaseOrder, PurchaseOrderItem};
use crate::pricing::{checked_sum, round_unit_cost, suggested_selling_price, AmountOverflow};

/// Reasons proration cannot run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProrationError {
    #[error("There are no items to prorate costs across")]
    EmptyItems,

    #[error("Cannot prorate costs: order subtotal is zero")]
    ZeroSubtotal,

    #[error("Cannot prorate costs: line {line} has quantity {quantity}")]
    InvalidQuantity { line: usize, quantity: i32 },

    #[error("Cannot prorate costs: amounts are out of range")]
    Overflow,
}

impl From<AmountOverflow> for ProrationError {
    fn from(_: AmountOverflow) -> Self {
        ProrationError::Overflow
    }
}

/// Proration result for a single line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProratedLine {
    /// This line's share of the additional costs
    pub prorated_amount: Decimal,
    pub prorated_unit_cost: Decimal,
    pub suggested_selling_price: Decimal,
}

/// What `apply_proration` did to the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationOutcome {
    Prorated,
    /// Additional costs were zero; lines were left as they were
    Unchanged,
}

/// Distribute `additional_costs` across `items`.
///
/// Returns one [`ProratedLine`] per item, in item order. A zero
/// `additional_costs` still yields lines whose unit cost equals the unit
/// price; callers that want the no-op behaviour use [`apply_proration`].
pub fn prorate(
    items: &[PurchaseOrderItem],
    additional_costs: Decimal,
) -> Result<Vec<ProratedLine>, ProrationError> {
    if items.is_empty() {
        return Err(ProrationError::EmptyItems);
    }

    if let Some((line, item)) = items.iter().enumerate().find(|(_, i)| i.quantity <= 0) {
        return Err(ProrationError::InvalidQuantity {
            line,
            quantity: item.quantity,
        });
    }

    let subtotal = checked_sum(items.iter().map(|i| i.total))?;
    if subtotal.is_zero() {
        return Err(ProrationError::ZeroSubtotal);
    }

    items
        .iter()
        .map(|item| -> Result<ProratedLine, ProrationError> {
            let prorated_amount = item
                .total
                .checked_div(subtotal)
                .and_then(|share| additional_costs.checked_mul(share))
                .ok_or(ProrationError::Overflow)?;
            let prorated_unit_cost = prorated_amount
                .checked_div(Decimal::from(item.quantity))
                .and_then(|per_unit| item.unit_price.checked_add(per_unit))
                .ok_or(ProrationError::Overflow)?;
            Ok(ProratedLine {
                prorated_amount,
                prorated_unit_cost,
                suggested_selling_price: suggested_selling_price(prorated_unit_cost)?,
            })
        })
        .collect()
}

/// Prorate the order's shipping, fees and discount into its lines.
///
/// Line totals are refreshed from quantity and unit price first. When the
/// additional costs net to zero nothing is written and
/// [`ProrationOutcome::Unchanged`] is returned. Unit costs are stored to
/// eight decimal places.
pub fn apply_proration(order: &mut PurchaseOrder) -> Result<ProrationOutcome, ProrationError> {
    if order.items.is_empty() {
        return Err(ProrationError::EmptyItems);
    }

    order.recalculate_total()?;
    let additional = order.additional_costs()?;
    if additional.is_zero() {
        return Ok(ProrationOutcome::Unchanged);
    }

    let lines = prorate(&order.items, additional)?;
    for (item, line) in order.items.iter_mut().zip(lines) {
        item.prorated_unit_cost = Some(round_unit_cost(line.prorated_unit_cost));
        item.suggested_selling_price = Some(line.suggested_selling_price);
    }

    Ok(ProrationOutcome::Prorated)
}
