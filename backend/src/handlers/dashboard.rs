//! Dashboard handlers

use axum::{extract::State, Json};
use shared::models::DashboardStats;

use crate::error::AppResult;
use crate::services::DashboardService;
use crate::AppState;

/// Headline figures for the dashboard
pub async fn get_dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let service = DashboardService::new(state.store, state.config.inventory.low_stock_threshold);
    let stats = service.stats().await?;
    Ok(Json(stats))
}
