//! Dashboard summary models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline figures for the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub low_stock_products: i64,
    /// Purchase orders still waiting for delivery
    pub pending_orders: i64,
}
