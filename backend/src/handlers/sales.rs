//! HTTP handlers for sales order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::SalesOrder;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::sales::{SalesOrderInput, SalesService};
use crate::AppState;

/// List sales orders, newest first
pub async fn list_sales_orders(State(state): State<AppState>) -> AppResult<Json<Vec<SalesOrder>>> {
    let service = SalesService::new(state.store);
    let orders = service.list().await?;
    Ok(Json(orders))
}

/// Get a sales order with its items
pub async fn get_sales_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SalesOrder>> {
    let service = SalesService::new(state.store);
    let order = service.get(id).await?;
    Ok(Json(order))
}

/// Create a sales order and take its items out of stock
pub async fn create_sales_order(
    State(state): State<AppState>,
    Json(input): Json<SalesOrderInput>,
) -> AppResult<(StatusCode, Json<SalesOrder>)> {
    let service = SalesService::new(state.store);
    let order = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Update a sales order
pub async fn update_sales_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SalesOrderInput>,
) -> AppResult<Json<SalesOrder>> {
    let service = SalesService::new(state.store);
    let order = service.update(id, input).await?;
    Ok(Json(order))
}

/// Delete a sales order
pub async fn delete_sales_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = SalesService::new(state.store);
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
