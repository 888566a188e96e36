//! Sales order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::{checked_sum, line_total, AmountOverflow};

/// A sales order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl SalesOrderItem {
    pub fn new(
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<Self, AmountOverflow> {
        Ok(Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            total: line_total(quantity, unit_price)?,
        })
    }

    pub fn recalculate_total(&mut self) -> Result<(), AmountOverflow> {
        self.total = line_total(self.quantity, self.unit_price)?;
        Ok(())
    }
}

/// A sale to a customer. Created complete; stock moves at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesOrder {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub items: Vec<SalesOrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalesOrder {
    pub fn recalculate_total(&mut self) -> Result<(), AmountOverflow> {
        for item in &mut self.items {
            item.recalculate_total()?;
        }
        self.total = checked_sum(self.items.iter().map(|i| i.total))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_total_is_sum_of_lines() {
        let now = Utc::now();
        let mut order = SalesOrder {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            customer_name: "Empresa ABC".to_string(),
            date: now,
            total: Decimal::ZERO,
            items: vec![
                SalesOrderItem::new(Uuid::new_v4(), "Laptop", 2, Decimal::new(700, 0)).unwrap(),
                SalesOrderItem::new(Uuid::new_v4(), "Mouse", 5, Decimal::new(21, 0)).unwrap(),
                SalesOrderItem::new(Uuid::new_v4(), "Keyboard", 2, Decimal::new(42, 0)).unwrap(),
            ],
            created_at: now,
            updated_at: now,
        };
        order.recalculate_total().unwrap();
        assert_eq!(order.total, Decimal::new(1589, 0));
    }

    #[test]
    fn test_oversized_line_is_reported() {
        assert_eq!(
            SalesOrderItem::new(Uuid::new_v4(), "Laptop", 2, Decimal::MAX),
            Err(AmountOverflow)
        );
    }
}
