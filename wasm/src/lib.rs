//! WebAssembly module for the Nimble inventory UI
//!
//! Provides client-side computation for the purchase and sales order
//! drafts, so the editor shows the same numbers the server will store:
//! - Cost proration and suggested selling prices
//! - Purchase and sales order totals
//!
//! Amounts cross the boundary as decimal strings inside JSON.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{PurchaseOrderItem, SalesOrderItem};
use shared::{
    additional_costs, checked_sum, prorate, round_half_up, round_unit_cost, suggested_selling_price,
    AmountOverflow, ProrationOutcome,
};
use wasm_bindgen::prelude::*;

/// Purchase order draft as edited in the browser
#[derive(Debug, Deserialize)]
struct PurchaseDraft {
    #[serde(default)]
    shipping_cost: Decimal,
    #[serde(default)]
    additional_fees: Decimal,
    #[serde(default)]
    discount: Decimal,
    #[serde(default)]
    items: Vec<DraftLine>,
}

#[derive(Debug, Deserialize)]
struct DraftLine {
    #[serde(default)]
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl PurchaseDraft {
    fn order_items(&self) -> Result<Vec<PurchaseOrderItem>, String> {
        self.items
            .iter()
            .map(|l| PurchaseOrderItem::new_product(l.product_name.clone(), l.quantity, l.unit_price))
            .collect::<Result<_, _>>()
            .map_err(|e| e.to_string())
    }

    fn additional_costs(&self) -> Result<Decimal, String> {
        additional_costs(self.shipping_cost, self.additional_fees, self.discount).map_err(|e| e.to_string())
    }

    /// Subtotal, additional costs and total
    fn totals(&self, items: &[PurchaseOrderItem]) -> Result<PurchaseTotals, String> {
        let subtotal = checked_sum(items.iter().map(|i| i.total)).map_err(|e| e.to_string())?;
        let additional = self.additional_costs()?;
        let total = subtotal
            .checked_add(additional)
            .ok_or_else(|| AmountOverflow.to_string())?;
        Ok(PurchaseTotals {
            subtotal,
            additional_costs: additional,
            total,
        })
    }
}

/// Proration result handed back to the editor
#[derive(Debug, Serialize)]
struct DraftProration {
    outcome: ProrationOutcome,
    subtotal: Decimal,
    additional_costs: Decimal,
    total: Decimal,
    lines: Vec<ProratedDraftLine>,
}

#[derive(Debug, Serialize)]
struct ProratedDraftLine {
    total: Decimal,
    prorated_unit_cost: Option<Decimal>,
    suggested_selling_price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct PurchaseTotals {
    subtotal: Decimal,
    additional_costs: Decimal,
    total: Decimal,
}

fn parse_draft(draft_json: &str) -> Result<PurchaseDraft, String> {
    serde_json::from_str(draft_json).map_err(|e| format!("Invalid draft JSON: {}", e))
}

fn parse_amount(value: &str) -> Result<Decimal, String> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("Invalid amount '{}': {}", value, e))
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Prorate a draft's shipping, fees and discount across its lines.
///
/// With zero additional costs the lines come back without prorated values.
pub fn prorate_draft_json(draft_json: &str) -> Result<String, String> {
    let draft = parse_draft(draft_json)?;
    let items = draft.order_items()?;
    if items.is_empty() {
        return Err(shared::ProrationError::EmptyItems.to_string());
    }

    let totals = draft.totals(&items)?;
    let (outcome, lines) = if totals.additional_costs.is_zero() {
        let lines = items
            .iter()
            .map(|i| ProratedDraftLine {
                total: i.total,
                prorated_unit_cost: None,
                suggested_selling_price: None,
            })
            .collect();
        (ProrationOutcome::Unchanged, lines)
    } else {
        let prorated = prorate(&items, totals.additional_costs).map_err(|e| e.to_string())?;
        let lines = items
            .iter()
            .zip(prorated)
            .map(|(i, p)| ProratedDraftLine {
                total: i.total,
                prorated_unit_cost: Some(round_unit_cost(p.prorated_unit_cost)),
                suggested_selling_price: Some(p.suggested_selling_price),
            })
            .collect();
        (ProrationOutcome::Prorated, lines)
    };

    let result = DraftProration {
        outcome,
        subtotal: totals.subtotal,
        additional_costs: totals.additional_costs,
        total: totals.total,
        lines,
    };
    serde_json::to_string(&result).map_err(|e| e.to_string())
}

/// Subtotal, additional costs and total of a purchase draft
pub fn purchase_totals_json(draft_json: &str) -> Result<String, String> {
    let draft = parse_draft(draft_json)?;
    let totals = draft.totals(&draft.order_items()?)?;
    serde_json::to_string(&totals).map_err(|e| e.to_string())
}

/// Total of a sales draft given as a JSON array of `{quantity, unit_price}`
pub fn sales_total(items_json: &str) -> Result<Decimal, String> {
    #[derive(Deserialize)]
    struct Line {
        quantity: i32,
        unit_price: Decimal,
    }

    let lines: Vec<Line> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;
    let totals = lines
        .into_iter()
        .map(|l| SalesOrderItem::new(Default::default(), "", l.quantity, l.unit_price).map(|i| i.total))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    checked_sum(totals).map_err(|e| e.to_string())
}

/// Suggested selling price for a unit cost, as a decimal string
pub fn suggested_price(unit_cost: &str) -> Result<String, String> {
    suggested_selling_price(parse_amount(unit_cost)?)
        .map(|price| price.to_string())
        .map_err(|e| e.to_string())
}

/// Round an amount to whole currency units, halves up
pub fn round_amount(value: &str) -> Result<String, String> {
    Ok(round_half_up(parse_amount(value)?).to_string())
}

// ============================================================================
// JavaScript bindings
// ============================================================================

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

/// Prorate additional costs across a purchase draft
#[wasm_bindgen(js_name = proratePurchaseCosts)]
pub fn prorate_purchase_costs(draft_json: &str) -> Result<String, JsValue> {
    prorate_draft_json(draft_json).map_err(to_js_error)
}

/// Totals of a purchase draft
#[wasm_bindgen(js_name = calculatePurchaseTotal)]
pub fn calculate_purchase_total(draft_json: &str) -> Result<String, JsValue> {
    purchase_totals_json(draft_json).map_err(to_js_error)
}

/// Total of a sales draft
#[wasm_bindgen(js_name = calculateSalesTotal)]
pub fn calculate_sales_total(items_json: &str) -> Result<String, JsValue> {
    sales_total(items_json)
        .map(|total| total.to_string())
        .map_err(to_js_error)
}

/// Suggested selling price at the default markup
#[wasm_bindgen(js_name = suggestSellingPrice)]
pub fn suggest_selling_price(unit_cost: &str) -> Result<String, JsValue> {
    suggested_price(unit_cost).map_err(to_js_error)
}

/// Round a price to whole currency units
#[wasm_bindgen(js_name = roundPrice)]
pub fn round_price(value: &str) -> Result<String, JsValue> {
    round_amount(value).map_err(to_js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const DRAFT: &str = r#"{
        "shipping_cost": "30",
        "additional_fees": "30",
        "discount": "10",
        "items": [
            {"product_name": "Laptop HP ProBook", "quantity": 5, "unit_price": "500"},
            {"product_name": "Teclado Logitech K380", "quantity": 10, "unit_price": "20"}
        ]
    }"#;

    fn dec(v: &Value) -> Decimal {
        v.as_str().unwrap().parse().unwrap()
    }

    #[test]
    fn test_prorate_draft() {
        let out: Value = serde_json::from_str(&prorate_draft_json(DRAFT).unwrap()).unwrap();

        assert_eq!(out["outcome"], "prorated");
        assert_eq!(dec(&out["subtotal"]), Decimal::from(2700));
        assert_eq!(dec(&out["total"]), Decimal::from(2750));
        assert_eq!(dec(&out["lines"][0]["suggested_selling_price"]), Decimal::from(713));
        assert_eq!(dec(&out["lines"][1]["suggested_selling_price"]), Decimal::from(29));
    }

    #[test]
    fn test_prorate_draft_without_costs() {
        let draft = r#"{"items": [{"quantity": 2, "unit_price": "10"}]}"#;
        let out: Value = serde_json::from_str(&prorate_draft_json(draft).unwrap()).unwrap();

        assert_eq!(out["outcome"], "unchanged");
        assert!(out["lines"][0]["prorated_unit_cost"].is_null());
    }

    #[test]
    fn test_prorate_draft_errors() {
        assert!(prorate_draft_json(r#"{"shipping_cost": "10"}"#).is_err());
        assert!(prorate_draft_json("not json").is_err());

        let zero = r#"{"shipping_cost": "10", "items": [{"quantity": 1, "unit_price": "0"}]}"#;
        assert!(prorate_draft_json(zero).unwrap_err().contains("subtotal is zero"));
    }

    #[test]
    fn test_purchase_totals() {
        let out: Value = serde_json::from_str(&purchase_totals_json(DRAFT).unwrap()).unwrap();
        assert_eq!(dec(&out["additional_costs"]), Decimal::from(50));
        assert_eq!(dec(&out["total"]), Decimal::from(2750));
    }

    #[test]
    fn test_sales_total() {
        let items = r#"[{"quantity": 2, "unit_price": "700"}, {"quantity": 1, "unit_price": "189"}]"#;
        assert_eq!(sales_total(items).unwrap(), Decimal::from(1589));
        assert_eq!(sales_total("[]").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_oversized_amounts_are_errors() {
        let huge = r#"{"shipping_cost": "10", "items": [{"quantity": 2, "unit_price": "79228162514264337593543950335"}]}"#;
        assert_eq!(prorate_draft_json(huge).unwrap_err(), "Amount is out of range");
        assert!(purchase_totals_json(huge).is_err());

        let sale = r#"[{"quantity": 2, "unit_price": "79228162514264337593543950335"}]"#;
        assert!(sales_total(sale).is_err());
        assert!(suggested_price("79228162514264337593543950335").is_err());
        assert_eq!(round_amount("79228162514264337593543950335").unwrap(), "79228162514264337593543950335");
    }

    #[test]
    fn test_suggested_price_and_rounding() {
        assert_eq!(suggested_price("500").unwrap(), "700");
        assert_eq!(round_amount("2.5").unwrap(), "3");
        assert!(suggested_price("abc").is_err());
    }
}
