//! HTTP handlers for reference data: categories, warehouses, customers and
//! suppliers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{Category, Customer, Supplier, Warehouse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
use crate::services::customer::{CreateCustomerInput, CustomerService, UpdateCustomerInput};
use crate::services::supplier::{CreateSupplierInput, SupplierService, UpdateSupplierInput};
use crate::services::warehouse::{CreateWarehouseInput, UpdateWarehouseInput, WarehouseService};
use crate::AppState;

// ============================================================================
// Categories
// ============================================================================

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryService::new(state.store).list().await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let category = CategoryService::new(state.store).get(id).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = CategoryService::new(state.store).create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    let category = CategoryService::new(state.store).update(id, input).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    CategoryService::new(state.store).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Warehouses
// ============================================================================

pub async fn list_warehouses(State(state): State<AppState>) -> AppResult<Json<Vec<Warehouse>>> {
    let warehouses = WarehouseService::new(state.store).list().await?;
    Ok(Json(warehouses))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = WarehouseService::new(state.store).get(id).await?;
    Ok(Json(warehouse))
}

pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let warehouse = WarehouseService::new(state.store).create(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = WarehouseService::new(state.store).update(id, input).await?;
    Ok(Json(warehouse))
}

pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    WarehouseService::new(state.store).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Customers
// ============================================================================

pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = CustomerService::new(state.store).list().await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let customer = CustomerService::new(state.store).get(id).await?;
    Ok(Json(customer))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = CustomerService::new(state.store).create(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let customer = CustomerService::new(state.store).update(id, input).await?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    CustomerService::new(state.store).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Suppliers
// ============================================================================

pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    let suppliers = SupplierService::new(state.store).list().await?;
    Ok(Json(suppliers))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let supplier = SupplierService::new(state.store).get(id).await?;
    Ok(Json(supplier))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let supplier = SupplierService::new(state.store).create(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    let supplier = SupplierService::new(state.store).update(id, input).await?;
    Ok(Json(supplier))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    SupplierService::new(state.store).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
