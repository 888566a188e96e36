//! Product catalogue service

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use shared::models::{PriceType, Product};
use uuid::Uuid;
use validator::Validate;

use super::{check_field, PriceHistoryService};
use crate::error::{AppError, AppResult};
use crate::store::{EntityStore, StoreTransaction};

/// Product service for catalogue and stock records
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn EntityStore>,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub warehouse_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub last_purchase_price: Decimal,
    #[serde(default)]
    pub selling_price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

/// Input for updating a product; absent fields keep their value.
///
/// For the warehouse and category, `null` clears the reference.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub warehouse_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<Uuid>>,
    pub last_purchase_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub stock: Option<i32>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// List products ordered by name
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        let mut tx = self.store.begin().await?;
        let products = tx.list_products().await?;
        tx.commit().await?;
        Ok(products)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        let mut tx = self.store.begin().await?;
        let product = tx
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        tx.commit().await?;
        Ok(product)
    }

    /// Create a product. A non-zero purchase price is recorded as the first
    /// purchase price observation.
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        input.validate()?;
        validate_figures(input.last_purchase_price, input.selling_price, input.stock)?;

        let mut tx = self.store.begin().await?;
        check_references(tx.as_mut(), input.warehouse_id, input.category_id).await?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            warehouse_id: input.warehouse_id,
            category_id: input.category_id,
            last_purchase_price: input.last_purchase_price,
            selling_price: input.selling_price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        };
        tx.insert_product(&product).await?;

        if product.last_purchase_price > Decimal::ZERO {
            PriceHistoryService::record(
                tx.as_mut(),
                product.id,
                product.last_purchase_price,
                PriceType::Purchase,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Created product {} ({})", product.name, product.id);
        Ok(product)
    }

    /// Update a product. A changed purchase price is recorded in the price
    /// history.
    pub async fn update(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let mut product = tx
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let previous_price = product.last_purchase_price;

        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = description;
        }
        if let Some(warehouse_id) = input.warehouse_id {
            product.warehouse_id = warehouse_id;
        }
        if let Some(category_id) = input.category_id {
            product.category_id = category_id;
        }
        if let Some(price) = input.last_purchase_price {
            product.last_purchase_price = price;
        }
        if let Some(price) = input.selling_price {
            product.selling_price = price;
        }
        if let Some(stock) = input.stock {
            product.stock = stock;
        }

        validate_figures(product.last_purchase_price, product.selling_price, product.stock)?;
        check_references(tx.as_mut(), input.warehouse_id.flatten(), input.category_id.flatten()).await?;

        product.updated_at = Utc::now();
        if !tx.update_product(&product).await? {
            return Err(AppError::NotFound("Product".to_string()));
        }

        if product.last_purchase_price != previous_price {
            PriceHistoryService::record(
                tx.as_mut(),
                product.id,
                product.last_purchase_price,
                PriceType::Purchase,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    /// Delete a product. Its price history is kept.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_product(id).await? {
            return Err(AppError::NotFound("Product".to_string()));
        }
        tx.commit().await?;

        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}

/// A field that is present maps to `Some`, even when it is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn validate_figures(last_purchase_price: Decimal, selling_price: Decimal, stock: i32) -> AppResult<()> {
    check_field("last_purchase_price", shared::validate_amount(last_purchase_price))?;
    check_field("selling_price", shared::validate_amount(selling_price))?;
    check_field("stock", shared::validate_stock(stock))
}

/// Supplied warehouse and category references must exist
async fn check_references(
    tx: &mut dyn StoreTransaction,
    warehouse_id: Option<Uuid>,
    category_id: Option<Uuid>,
) -> AppResult<()> {
    if let Some(id) = warehouse_id {
        if tx.get_warehouse(id).await?.is_none() {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
    }
    if let Some(id) = category_id {
        if tx.get_category(id).await?.is_none() {
            return Err(AppError::NotFound("Category".to_string()));
        }
    }
    Ok(())
}
