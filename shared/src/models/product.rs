//! Product and price history models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stocked product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// None for products created by a delivered new-product purchase line
    pub warehouse_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub last_purchase_price: Decimal,
    pub selling_price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can cover a sale of `quantity` units
    pub fn can_fulfill(&self, quantity: i32) -> bool {
        quantity <= self.stock
    }

    pub fn is_low_stock(&self, threshold: i32) -> bool {
        self.stock <= threshold
    }
}

/// Kind of price observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Purchase,
    Sale,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::Purchase => "purchase",
            PriceType::Sale => "sale",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(PriceType::Purchase),
            "sale" => Some(PriceType::Sale),
            _ => None,
        }
    }
}

impl std::fmt::Display for PriceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed purchase or sale price. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceHistory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub price: Decimal,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub price_type: PriceType,
    pub created_at: DateTime<Utc>,
}

impl PriceHistory {
    pub fn new(product_id: Uuid, price: Decimal, price_type: PriceType, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            price,
            date,
            price_type,
            created_at: Utc::now(),
        }
    }
}
