//! Price history handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{PriceHistory, PriceType};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::PriceHistoryService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordPriceInput {
    pub price: Decimal,
    #[serde(rename = "type")]
    pub price_type: PriceType,
}

/// List all price history entries, newest first
pub async fn list_price_history(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PriceHistory>>> {
    let service = PriceHistoryService::new(state.store);
    let entries = service.list_all().await?;
    Ok(Json(entries))
}

/// Price history of one product, newest first
pub async fn get_product_price_history(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<PriceHistory>>> {
    let service = PriceHistoryService::new(state.store);
    let entries = service.get_by_product_id(product_id).await?;
    Ok(Json(entries))
}

/// Record a manual price observation for a product
pub async fn record_product_price(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<RecordPriceInput>,
) -> AppResult<(StatusCode, Json<PriceHistory>)> {
    let service = PriceHistoryService::new(state.store);
    let entry = service
        .record_standalone(product_id, input.price, input.price_type)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Export price history as CSV
pub async fn export_price_history(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let service = PriceHistoryService::new(state.store);
    let csv = service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"price_history.csv\""),
        ],
        csv,
    ))
}
