//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::{additional_costs, checked_sum, line_total, AmountOverflow};

/// Purchase order status. DELIVERED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    #[default]
    Ordered,
    Delivered,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Ordered => "ORDERED",
            PurchaseStatus::Delivered => "DELIVERED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ORDERED" => Some(PurchaseStatus::Ordered),
            "DELIVERED" => Some(PurchaseStatus::Delivered),
            _ => None,
        }
    }

    /// Allowed moves: staying put, or ORDERED -> DELIVERED
    pub fn can_transition_to(&self, next: PurchaseStatus) -> bool {
        matches!(
            (*self, next),
            (PurchaseStatus::Ordered, _) | (PurchaseStatus::Delivered, PurchaseStatus::Delivered)
        )
    }

    /// True only for the move that triggers delivery effects
    pub fn is_delivery(previous: PurchaseStatus, next: PurchaseStatus) -> bool {
        previous == PurchaseStatus::Ordered && next == PurchaseStatus::Delivered
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchase order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrderItem {
    /// None for a new-product line that has not been delivered yet
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub is_new_product: bool,
    /// Unit price plus this line's share of shipping, fees and discount
    pub prorated_unit_cost: Option<Decimal>,
    pub suggested_selling_price: Option<Decimal>,
}

impl PurchaseOrderItem {
    /// Line for an already stocked product
    pub fn existing(
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<Self, AmountOverflow> {
        Ok(Self {
            product_id: Some(product_id),
            product_name: product_name.into(),
            quantity,
            unit_price,
            total: line_total(quantity, unit_price)?,
            is_new_product: false,
            prorated_unit_cost: None,
            suggested_selling_price: None,
        })
    }

    /// Line for a product that will be created on delivery
    pub fn new_product(
        product_name: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<Self, AmountOverflow> {
        Ok(Self {
            product_id: None,
            is_new_product: true,
            ..Self::existing(Uuid::nil(), product_name, quantity, unit_price)?
        })
    }

    pub fn recalculate_total(&mut self) -> Result<(), AmountOverflow> {
        self.total = line_total(self.quantity, self.unit_price)?;
        Ok(())
    }
}

/// A purchase order placed with a supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub date: DateTime<Utc>,
    pub status: PurchaseStatus,
    pub shipping_cost: Decimal,
    pub additional_fees: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub items: Vec<PurchaseOrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Sum of line totals, before shipping, fees and discount
    pub fn subtotal(&self) -> Result<Decimal, AmountOverflow> {
        checked_sum(self.items.iter().map(|i| i.total))
    }

    pub fn additional_costs(&self) -> Result<Decimal, AmountOverflow> {
        additional_costs(self.shipping_cost, self.additional_fees, self.discount)
    }

    /// Recompute every line total and the order total
    pub fn recalculate_total(&mut self) -> Result<(), AmountOverflow> {
        for item in &mut self.items {
            item.recalculate_total()?;
        }
        self.total = self
            .subtotal()?
            .checked_add(self.additional_costs()?)
            .ok_or(AmountOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: Vec<PurchaseOrderItem>) -> PurchaseOrder {
        let now = Utc::now();
        PurchaseOrder {
            id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            supplier_name: "Distribuidora Tech".to_string(),
            date: now,
            status: PurchaseStatus::Ordered,
            shipping_cost: Decimal::new(50, 0),
            additional_fees: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_transitions() {
        use PurchaseStatus::*;
        assert!(Ordered.can_transition_to(Ordered));
        assert!(Ordered.can_transition_to(Delivered));
        assert!(Delivered.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Ordered));
    }

    #[test]
    fn test_only_ordered_to_delivered_is_delivery() {
        use PurchaseStatus::*;
        assert!(PurchaseStatus::is_delivery(Ordered, Delivered));
        assert!(!PurchaseStatus::is_delivery(Delivered, Delivered));
        assert!(!PurchaseStatus::is_delivery(Ordered, Ordered));
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&PurchaseStatus::Delivered).unwrap();
        assert_eq!(json, "\"DELIVERED\"");
        assert_eq!(PurchaseStatus::from_str("ORDERED"), Some(PurchaseStatus::Ordered));
    }

    #[test]
    fn test_total_includes_costs() {
        let mut po = order(vec![
            PurchaseOrderItem::existing(Uuid::new_v4(), "Laptop", 5, Decimal::new(500, 0)).unwrap(),
            PurchaseOrderItem::existing(Uuid::new_v4(), "Keyboard", 10, Decimal::new(20, 0)).unwrap(),
        ]);
        po.additional_fees = Decimal::new(10, 0);
        po.discount = Decimal::new(15, 0);
        po.recalculate_total().unwrap();
        // 2500 + 200 + 50 + 10 - 15
        assert_eq!(po.total, Decimal::new(2745, 0));
    }

    #[test]
    fn test_recalculate_ignores_stale_line_totals() {
        let mut item = PurchaseOrderItem::existing(Uuid::new_v4(), "Mouse", 2, Decimal::new(15, 0)).unwrap();
        item.total = Decimal::new(999, 0);
        let mut po = order(vec![item]);
        po.shipping_cost = Decimal::ZERO;
        po.recalculate_total().unwrap();
        assert_eq!(po.items[0].total, Decimal::new(30, 0));
        assert_eq!(po.total, Decimal::new(30, 0));
    }

    #[test]
    fn test_new_product_line_has_no_reference() {
        let item = PurchaseOrderItem::new_product("Webcam", 3, Decimal::new(40, 0)).unwrap();
        assert!(item.is_new_product);
        assert!(item.product_id.is_none());
        assert_eq!(item.total, Decimal::new(120, 0));
    }

    #[test]
    fn test_oversized_amounts_are_reported() {
        assert_eq!(
            PurchaseOrderItem::existing(Uuid::new_v4(), "Servidor", 2, Decimal::MAX),
            Err(AmountOverflow)
        );

        let mut po = order(vec![PurchaseOrderItem::existing(Uuid::new_v4(), "Servidor", 1, Decimal::MAX).unwrap()]);
        assert_eq!(po.recalculate_total(), Err(AmountOverflow));

        po.items[0].unit_price = Decimal::new(100, 0);
        po.recalculate_total().unwrap();
        assert_eq!(po.total, Decimal::new(150, 0));
    }
}
