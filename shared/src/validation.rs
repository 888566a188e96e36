//! Validation utilities for the Nimble inventory system
//!
//! Field-level checks return a static message; the backend wraps them in its
//! own error type with the offending field name.

use rust_decimal::Decimal;

use crate::models::{PurchaseOrderItem, SalesOrderItem};
use crate::pricing::{AMOUNT_SCALE, MAX_AMOUNT};

// ============================================================================
// Money and Quantity Validations
// ============================================================================

/// Validate a price or cost amount: not negative and storable as
/// `NUMERIC(14, 4)`
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    if amount > MAX_AMOUNT {
        return Err("Amount is too large");
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err("Amount can have at most 4 decimal places");
    }
    Ok(())
}

/// Validate a computed line or order total fits the store.
///
/// Purchase totals may be negative when the discount exceeds everything else.
pub fn validate_total(total: Decimal) -> Result<(), &'static str> {
    if total.abs() > MAX_AMOUNT {
        return Err("Order total is too large");
    }
    Ok(())
}

/// Validate an order line quantity (strictly positive)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Validate a stock level (never negative)
pub fn validate_stock(stock: i32) -> Result<(), &'static str> {
    if stock < 0 {
        return Err("Stock cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Order Line Validations
// ============================================================================

/// Validate one purchase order line.
///
/// Existing-product lines need a product reference; new-product lines need a
/// name to create the product with.
pub fn validate_purchase_item(item: &PurchaseOrderItem) -> Result<(), &'static str> {
    validate_quantity(item.quantity)?;
    validate_amount(item.unit_price)?;
    validate_total(item.total)?;
    if item.is_new_product {
        if item.product_name.trim().is_empty() {
            return Err("New product lines need a product name");
        }
    } else if item.product_id.is_none() {
        return Err("Product reference is required");
    }
    if let Some(price) = item.suggested_selling_price {
        validate_amount(price)?;
    }
    if let Some(cost) = item.prorated_unit_cost {
        validate_total(cost)?;
    }
    Ok(())
}

/// Validate one sales order line
pub fn validate_sales_item(item: &SalesOrderItem) -> Result<(), &'static str> {
    validate_quantity(item.quantity)?;
    validate_amount(item.unit_price)?;
    validate_total(item.total)?;
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate warehouse code format (2-10 uppercase alphanumeric)
pub fn validate_warehouse_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 2 {
        return Err("Warehouse code must be at least 2 characters");
    }
    if code.len() > 10 {
        return Err("Warehouse code must be at most 10 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Warehouse code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate phone number format (digits with optional +, spaces and dashes)
/// Accepts: +54 11 1234-5678, 011-1234-5678, 1112345678
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ' || c == '(' || c == ')')
    {
        return Err("Phone number contains invalid characters");
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(6..=15).contains(&digits) {
        return Err("Phone number must have between 6 and 15 digits");
    }
    Ok(())
}
