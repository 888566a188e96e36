//! Purchase order service
//!
//! Purchase orders start ORDERED and become DELIVERED once. The delivery
//! transition is what moves inventory: each line either adds stock to an
//! existing product or creates a new product, and every delivered line
//! records one purchase price observation. Effects run in the same store
//! transaction as the order write, so a failing line rolls back the whole
//! delivery.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{PriceType, Product, PurchaseOrder, PurchaseOrderItem, PurchaseStatus};
use shared::{apply_proration, round_unit_cost, suggested_selling_price, AmountOverflow, ProrationOutcome};
use uuid::Uuid;

use super::{check_field, PriceHistoryService};
use crate::error::{AppError, AppResult};
use crate::store::{EntityStore, StoreTransaction};

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseService {
    store: Arc<dyn EntityStore>,
}

/// Purchase order as submitted for create, update or proration.
///
/// Line and order totals are always recomputed server side.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderInput {
    pub supplier_id: Option<Uuid>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: PurchaseStatus,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub additional_fees: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub items: Vec<PurchaseOrderItemInput>,
}

/// One submitted purchase line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderItemInput {
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub is_new_product: bool,
    pub prorated_unit_cost: Option<Decimal>,
    pub suggested_selling_price: Option<Decimal>,
}

impl PurchaseOrderItemInput {
    fn into_item(self) -> Result<PurchaseOrderItem, AmountOverflow> {
        let mut item = PurchaseOrderItem {
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total: Decimal::ZERO,
            is_new_product: self.is_new_product,
            prorated_unit_cost: self.prorated_unit_cost.map(round_unit_cost),
            suggested_selling_price: self.suggested_selling_price,
        };
        item.recalculate_total()?;
        Ok(item)
    }
}

/// Result of prorating an unsaved draft
#[derive(Debug, Clone, Serialize)]
pub struct ProrationDraft {
    pub outcome: ProrationOutcome,
    pub order: PurchaseOrder,
}

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// List purchase orders, newest first
    pub async fn list(&self) -> AppResult<Vec<PurchaseOrder>> {
        let mut tx = self.store.begin().await?;
        let orders = tx.list_purchase_orders().await?;
        tx.commit().await?;
        Ok(orders)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<PurchaseOrder> {
        let mut tx = self.store.begin().await?;
        let order = tx
            .get_purchase_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;
        tx.commit().await?;
        Ok(order)
    }

    /// Create a purchase order. An order created as DELIVERED applies its
    /// delivery effects immediately.
    pub async fn create(&self, input: PurchaseOrderInput) -> AppResult<PurchaseOrder> {
        let supplier_id = validate_order(&input)?;

        let mut tx = self.store.begin().await?;
        let supplier = tx
            .get_supplier(supplier_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;
        let items = resolve_items(tx.as_mut(), input.items, false).await?;

        let now = Utc::now();
        let mut order = PurchaseOrder {
            id: Uuid::new_v4(),
            supplier_id,
            supplier_name: supplier.name,
            date: input.date.unwrap_or(now),
            status: input.status,
            shipping_cost: input.shipping_cost,
            additional_fees: input.additional_fees,
            discount: input.discount,
            total: Decimal::ZERO,
            items,
            created_at: now,
            updated_at: now,
        };
        order.recalculate_total()?;
        check_field("total", shared::validate_total(order.total))?;

        if PurchaseStatus::is_delivery(PurchaseStatus::Ordered, order.status) {
            apply_delivery_effects(tx.as_mut(), &mut order).await?;
        }

        tx.insert_purchase_order(&order).await?;
        tx.commit().await?;

        tracing::info!(
            "Created purchase order {} ({}, {} items, total {})",
            order.id,
            order.status,
            order.items.len(),
            order.total
        );
        Ok(order)
    }

    /// Replace a purchase order's fields and lines.
    ///
    /// Delivery effects run only when the stored status is ORDERED and the
    /// new one is DELIVERED; resubmitting a delivered order changes nothing
    /// in inventory.
    pub async fn update(&self, id: Uuid, input: PurchaseOrderInput) -> AppResult<PurchaseOrder> {
        let supplier_id = validate_order(&input)?;

        let mut tx = self.store.begin().await?;
        let existing = tx
            .get_purchase_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        if !existing.status.can_transition_to(input.status) {
            tracing::warn!(
                "Rejected status change {} -> {} on purchase order {}",
                existing.status,
                input.status,
                id
            );
            return Err(AppError::InvalidStateTransition(format!(
                "{} -> {}",
                existing.status, input.status
            )));
        }

        let supplier = tx
            .get_supplier(supplier_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;
        let already_delivered = existing.status == PurchaseStatus::Delivered;
        let items = resolve_items(tx.as_mut(), input.items, already_delivered).await?;

        let mut order = PurchaseOrder {
            id,
            supplier_id,
            supplier_name: supplier.name,
            date: input.date.unwrap_or(existing.date),
            status: input.status,
            shipping_cost: input.shipping_cost,
            additional_fees: input.additional_fees,
            discount: input.discount,
            total: Decimal::ZERO,
            items,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        order.recalculate_total()?;
        check_field("total", shared::validate_total(order.total))?;

        if PurchaseStatus::is_delivery(existing.status, order.status) {
            apply_delivery_effects(tx.as_mut(), &mut order).await?;
        }

        if !tx.update_purchase_order(&order).await? {
            return Err(AppError::NotFound("Purchase order".to_string()));
        }
        tx.commit().await?;

        tracing::info!("Updated purchase order {} ({})", order.id, order.status);
        Ok(order)
    }

    /// Delete a purchase order. Inventory effects of a delivered order stay.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_purchase_order(id).await? {
            return Err(AppError::NotFound("Purchase order".to_string()));
        }
        tx.commit().await?;

        tracing::info!("Deleted purchase order {}", id);
        Ok(())
    }

    /// Prorate shipping, fees and discount across an unsaved draft.
    ///
    /// Nothing is read from or written to the store.
    pub fn prorate_draft(&self, input: PurchaseOrderInput) -> AppResult<ProrationDraft> {
        let now = Utc::now();
        let mut order = PurchaseOrder {
            id: Uuid::nil(),
            supplier_id: input.supplier_id.unwrap_or_default(),
            supplier_name: String::new(),
            date: input.date.unwrap_or(now),
            status: input.status,
            shipping_cost: input.shipping_cost,
            additional_fees: input.additional_fees,
            discount: input.discount,
            total: Decimal::ZERO,
            items: input
                .items
                .into_iter()
                .map(PurchaseOrderItemInput::into_item)
                .collect::<Result<_, _>>()?,
            created_at: now,
            updated_at: now,
        };

        let outcome = apply_proration(&mut order)?;
        Ok(ProrationDraft { outcome, order })
    }
}

/// Check the order header and return the supplier id
fn validate_order(input: &PurchaseOrderInput) -> AppResult<Uuid> {
    let supplier_id = input.supplier_id.ok_or_else(|| {
        AppError::validation("supplier_id", "Supplier is required", "Debe seleccionar un proveedor")
    })?;

    if input.items.is_empty() {
        return Err(AppError::validation(
            "items",
            "Add at least one item to the order",
            "Debe agregar al menos un artículo a la orden",
        ));
    }

    check_field("shipping_cost", shared::validate_amount(input.shipping_cost))?;
    check_field("additional_fees", shared::validate_amount(input.additional_fees))?;
    check_field("discount", shared::validate_amount(input.discount))?;

    Ok(supplier_id)
}

/// Validate submitted lines and fill product names from the catalogue.
///
/// New-product lines only keep a product reference once the order has been
/// delivered, since that reference points at the product delivery created.
async fn resolve_items(
    tx: &mut dyn StoreTransaction,
    inputs: Vec<PurchaseOrderItemInput>,
    already_delivered: bool,
) -> AppResult<Vec<PurchaseOrderItem>> {
    let mut items = Vec::with_capacity(inputs.len());

    for input in inputs {
        let mut item = input.into_item()?;
        check_field("items", shared::validate_purchase_item(&item))?;

        if item.is_new_product {
            item.product_name = item.product_name.trim().to_string();
            if !already_delivered {
                item.product_id = None;
            }
        } else if let Some(product_id) = item.product_id {
            let product = tx
                .get_product(product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;
            item.product_name = product.name;
        }

        items.push(item);
    }

    Ok(items)
}

/// Apply the ORDERED -> DELIVERED inventory effects of every line
async fn apply_delivery_effects(
    tx: &mut dyn StoreTransaction,
    order: &mut PurchaseOrder,
) -> AppResult<()> {
    let now = Utc::now();

    for item in &mut order.items {
        let product_id = if item.is_new_product {
            let selling_price = match item.suggested_selling_price {
                Some(price) => price,
                None => suggested_selling_price(item.unit_price)?,
            };
            let product = Product {
                id: Uuid::new_v4(),
                name: item.product_name.clone(),
                description: String::new(),
                warehouse_id: None,
                category_id: None,
                last_purchase_price: item.unit_price,
                selling_price,
                stock: item.quantity,
                created_at: now,
                updated_at: now,
            };
            tx.insert_product(&product).await?;
            item.product_id = Some(product.id);

            tracing::debug!(
                "Delivery created product {} ({}) with stock {}",
                product.name,
                product.id,
                product.stock
            );
            product.id
        } else {
            let product_id = item.product_id.ok_or_else(|| {
                AppError::validation("items", "Product reference is required", "Debe seleccionar un producto")
            })?;
            let mut product = tx
                .get_product(product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;

            product.stock = product.stock.checked_add(item.quantity).ok_or_else(|| {
                AppError::ValidationError(format!("Stock overflow for product {}", product.name))
            })?;
            product.last_purchase_price = item.unit_price;
            if let Some(price) = item.suggested_selling_price {
                product.selling_price = price;
            }
            product.updated_at = now;

            if !tx.update_product(&product).await? {
                return Err(AppError::NotFound(format!("Product {}", product_id)));
            }

            tracing::debug!(
                "Delivery added {} units to product {} (stock now {})",
                item.quantity,
                product.id,
                product.stock
            );
            product.id
        };

        PriceHistoryService::record(tx, product_id, item.unit_price, PriceType::Purchase).await?;
    }

    tracing::info!("Applied delivery effects for purchase order {}", order.id);
    Ok(())
}
