//! HTTP handlers for product endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::Product;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::product::{CreateProductInput, ProductService, UpdateProductInput};
use crate::AppState;

/// List products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.store);
    let products = service.list().await?;
    Ok(Json(products))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.store);
    let product = service.get(id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let service = ProductService::new(state.store);
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.store);
    let product = service.update(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.store);
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
