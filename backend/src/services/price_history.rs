//! Price history recorder and queries
//!
//! Entries are append-only. Recording happens inside whatever transaction
//! observed the price, so a rolled back order leaves no history behind.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{PriceHistory, PriceType};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{EntityStore, StoreTransaction};

/// Price history service
#[derive(Clone)]
pub struct PriceHistoryService {
    store: Arc<dyn EntityStore>,
}

/// One line of the CSV trend export
#[derive(Debug, Serialize)]
struct PriceTrendRow {
    date: DateTime<Utc>,
    product_id: Uuid,
    product_name: String,
    #[serde(rename = "type")]
    price_type: &'static str,
    price: Decimal,
}

impl PriceHistoryService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Append one price observation inside the caller's transaction
    pub async fn record(
        tx: &mut dyn StoreTransaction,
        product_id: Uuid,
        price: Decimal,
        price_type: PriceType,
    ) -> AppResult<PriceHistory> {
        let entry = PriceHistory::new(product_id, price, price_type, Utc::now());
        tx.insert_price_history(&entry).await?;

        tracing::debug!(
            "Recorded {} price {} for product {}",
            price_type,
            price,
            product_id
        );

        Ok(entry)
    }

    /// Record a price observation in its own transaction
    pub async fn record_standalone(
        &self,
        product_id: Uuid,
        price: Decimal,
        price_type: PriceType,
    ) -> AppResult<PriceHistory> {
        super::check_field("price", shared::validate_amount(price))?;

        let mut tx = self.store.begin().await?;
        if tx.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let entry = Self::record(tx.as_mut(), product_id, price, price_type).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// History of one product, newest first
    pub async fn get_by_product_id(&self, product_id: Uuid) -> AppResult<Vec<PriceHistory>> {
        let mut tx = self.store.begin().await?;
        if tx.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let entries = tx.price_history_for_product(product_id).await?;
        tx.commit().await?;

        Ok(entries)
    }

    /// Every entry, newest first
    pub async fn list_all(&self) -> AppResult<Vec<PriceHistory>> {
        let mut tx = self.store.begin().await?;
        let entries = tx.list_price_history().await?;
        tx.commit().await?;

        Ok(entries)
    }

    /// Export the full history as CSV, newest first.
    ///
    /// Entries of deleted products are kept with an empty product name.
    pub async fn export_csv(&self) -> AppResult<String> {
        let mut tx = self.store.begin().await?;
        let entries = tx.list_price_history().await?;
        let names: HashMap<Uuid, String> = tx
            .list_products()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        tx.commit().await?;

        let mut wtr = csv::Writer::from_writer(vec![]);
        for entry in entries {
            wtr.serialize(PriceTrendRow {
                date: entry.date,
                product_id: entry.product_id,
                product_name: names.get(&entry.product_id).cloned().unwrap_or_default(),
                price_type: entry.price_type.as_str(),
                price: entry.price,
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        String::from_utf8(data).map_err(|e| AppError::Internal(e.to_string()))
    }
}
