//! Dashboard summary service

use std::sync::Arc;

use shared::checked_sum;
use shared::models::{DashboardStats, PurchaseStatus};

use crate::error::AppResult;
use crate::store::EntityStore;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn EntityStore>,
    low_stock_threshold: i32,
}

impl DashboardService {
    pub fn new(store: Arc<dyn EntityStore>, low_stock_threshold: i32) -> Self {
        Self {
            store,
            low_stock_threshold,
        }
    }

    /// Sales and purchase totals, low stock count and undelivered orders,
    /// read from one consistent snapshot
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let mut tx = self.store.begin().await?;
        let sales = tx.list_sales_orders().await?;
        let purchases = tx.list_purchase_orders().await?;
        let products = tx.list_products().await?;
        tx.commit().await?;

        Ok(DashboardStats {
            total_sales: checked_sum(sales.iter().map(|o| o.total))?,
            total_purchases: checked_sum(purchases.iter().map(|o| o.total))?,
            low_stock_products: products
                .iter()
                .filter(|p| p.is_low_stock(self.low_stock_threshold))
                .count() as i64,
            pending_orders: purchases
                .iter()
                .filter(|o| o.status == PurchaseStatus::Ordered)
                .count() as i64,
        })
    }
}
