//! Route definitions for the Nimble inventory API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/customers", customer_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/purchases", purchase_routes())
        .nest("/sales", sales_routes())
        .nest("/price-history", price_history_routes())
        .route("/dashboard/stats", get(handlers::get_dashboard_stats))
}

/// Product routes, including per-product price history
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/:id/price-history",
            get(handlers::get_product_price_history).post(handlers::record_product_price),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route(
            "/:id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_customers).post(handlers::create_customer))
        .route(
            "/:id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

/// Purchase order routes
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        // Draft proration, nothing is stored
        .route("/prorate", post(handlers::prorate_purchase_order))
        .route(
            "/:id",
            get(handlers::get_purchase_order)
                .put(handlers::update_purchase_order)
                .delete(handlers::delete_purchase_order),
        )
}

/// Sales order routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales_orders).post(handlers::create_sales_order))
        .route(
            "/:id",
            get(handlers::get_sales_order)
                .put(handlers::update_sales_order)
                .delete(handlers::delete_sales_order),
        )
}

fn price_history_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_price_history))
        .route("/export", get(handlers::export_price_history))
}
