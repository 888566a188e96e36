//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::PurchaseOrder;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::purchase::{ProrationDraft, PurchaseOrderInput, PurchaseService};
use crate::AppState;

/// List purchase orders, newest first
pub async fn list_purchase_orders(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PurchaseOrder>>> {
    let service = PurchaseService::new(state.store);
    let orders = service.list().await?;
    Ok(Json(orders))
}

/// Get a purchase order with its items
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseService::new(state.store);
    let order = service.get(id).await?;
    Ok(Json(order))
}

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(input): Json<PurchaseOrderInput>,
) -> AppResult<(StatusCode, Json<PurchaseOrder>)> {
    let service = PurchaseService::new(state.store);
    let order = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Update a purchase order, delivering it when the status moves to DELIVERED
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseService::new(state.store);
    let order = service.update(id, input).await?;
    Ok(Json(order))
}

/// Delete a purchase order
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PurchaseService::new(state.store);
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Prorate additional costs across an unsaved draft
pub async fn prorate_purchase_order(
    State(state): State<AppState>,
    Json(input): Json<PurchaseOrderInput>,
) -> AppResult<Json<ProrationDraft>> {
    let service = PurchaseService::new(state.store);
    let draft = service.prorate_draft(input)?;
    Ok(Json(draft))
}
