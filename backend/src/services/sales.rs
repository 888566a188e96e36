//! Sales order service
//!
//! A sales order is complete when created: stock leaves the shelf and a sale
//! price is recorded for every line in the same transaction. Editing an
//! order later rewrites its lines but never moves stock again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{PriceType, SalesOrder, SalesOrderItem};
use uuid::Uuid;

use super::{check_field, PriceHistoryService};
use crate::error::{AppError, AppResult};
use crate::store::{EntityStore, StoreTransaction};

/// Sales order service
#[derive(Clone)]
pub struct SalesService {
    store: Arc<dyn EntityStore>,
}

/// Sales order as submitted for create or update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesOrderInput {
    pub customer_id: Option<Uuid>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<SalesOrderItemInput>,
}

/// One submitted sales line
#[derive(Debug, Clone, Deserialize)]
pub struct SalesOrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Defaults to the product's selling price
    pub unit_price: Option<Decimal>,
}

impl SalesService {
    /// Create a new SalesService instance
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// List sales orders, newest first
    pub async fn list(&self) -> AppResult<Vec<SalesOrder>> {
        let mut tx = self.store.begin().await?;
        let orders = tx.list_sales_orders().await?;
        tx.commit().await?;
        Ok(orders)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<SalesOrder> {
        let mut tx = self.store.begin().await?;
        let order = tx
            .get_sales_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sales order".to_string()))?;
        tx.commit().await?;
        Ok(order)
    }

    /// Create a sales order, taking every line out of stock.
    ///
    /// A line asking for more than the product holds fails the whole order
    /// with `InsufficientStock`.
    pub async fn create(&self, input: SalesOrderInput) -> AppResult<SalesOrder> {
        let customer_id = validate_order(&input)?;

        let mut tx = self.store.begin().await?;
        let customer = tx
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        let now = Utc::now();
        let mut items = Vec::with_capacity(input.items.len());
        for line in input.items {
            let mut product = tx
                .get_product(line.product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {}", line.product_id)))?;

            if !product.can_fulfill(line.quantity) {
                tracing::warn!(
                    "Rejected sale of {} units of product {} with stock {}",
                    line.quantity,
                    product.id,
                    product.stock
                );
                return Err(AppError::InsufficientStock(format!(
                    "{}: requested {}, available {}",
                    product.name, line.quantity, product.stock
                )));
            }

            let item = SalesOrderItem::new(
                product.id,
                product.name.clone(),
                line.quantity,
                line.unit_price.unwrap_or(product.selling_price),
            )?;
            check_field("items", shared::validate_sales_item(&item))?;

            product.stock -= line.quantity;
            product.updated_at = now;
            if !tx.update_product(&product).await? {
                return Err(AppError::NotFound(format!("Product {}", product.id)));
            }

            PriceHistoryService::record(tx.as_mut(), product.id, item.unit_price, PriceType::Sale)
                .await?;

            tracing::debug!(
                "Sale took {} units of product {} (stock now {})",
                line.quantity,
                product.id,
                product.stock
            );
            items.push(item);
        }

        let mut order = SalesOrder {
            id: Uuid::new_v4(),
            customer_id,
            customer_name: customer.name,
            date: input.date.unwrap_or(now),
            total: Decimal::ZERO,
            items,
            created_at: now,
            updated_at: now,
        };
        order.recalculate_total()?;
        check_field("total", shared::validate_total(order.total))?;

        tx.insert_sales_order(&order).await?;
        tx.commit().await?;

        tracing::info!(
            "Created sales order {} ({} items, total {})",
            order.id,
            order.items.len(),
            order.total
        );
        Ok(order)
    }

    /// Replace a sales order's fields and lines without moving stock
    pub async fn update(&self, id: Uuid, input: SalesOrderInput) -> AppResult<SalesOrder> {
        let customer_id = validate_order(&input)?;

        let mut tx = self.store.begin().await?;
        let existing = tx
            .get_sales_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sales order".to_string()))?;
        let customer = tx
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        let items = resolve_items(tx.as_mut(), input.items).await?;

        let mut order = SalesOrder {
            id,
            customer_id,
            customer_name: customer.name,
            date: input.date.unwrap_or(existing.date),
            total: Decimal::ZERO,
            items,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        order.recalculate_total()?;
        check_field("total", shared::validate_total(order.total))?;

        if !tx.update_sales_order(&order).await? {
            return Err(AppError::NotFound("Sales order".to_string()));
        }
        tx.commit().await?;

        tracing::info!("Updated sales order {}", order.id);
        Ok(order)
    }

    /// Delete a sales order. Sold stock is not returned.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_sales_order(id).await? {
            return Err(AppError::NotFound("Sales order".to_string()));
        }
        tx.commit().await?;

        tracing::info!("Deleted sales order {}", id);
        Ok(())
    }
}

fn validate_order(input: &SalesOrderInput) -> AppResult<Uuid> {
    let customer_id = input.customer_id.ok_or_else(|| {
        AppError::validation("customer_id", "Customer is required", "Debe seleccionar un cliente")
    })?;

    if input.items.is_empty() {
        return Err(AppError::validation(
            "items",
            "Add at least one item to the order",
            "Debe agregar al menos un artículo a la orden",
        ));
    }

    for line in &input.items {
        check_field("items", shared::validate_quantity(line.quantity))?;
    }

    Ok(customer_id)
}

async fn resolve_items(
    tx: &mut dyn StoreTransaction,
    inputs: Vec<SalesOrderItemInput>,
) -> AppResult<Vec<SalesOrderItem>> {
    let mut items = Vec::with_capacity(inputs.len());
    for line in inputs {
        let product = tx
            .get_product(line.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", line.product_id)))?;
        let item = SalesOrderItem::new(
            product.id,
            product.name,
            line.quantity,
            line.unit_price.unwrap_or(product.selling_price),
        )?;
        check_field("items", shared::validate_sales_item(&item))?;
        items.push(item);
    }
    Ok(items)
}
