//! Warehouse service

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::models::Warehouse;
use uuid::Uuid;
use validator::Validate;

use super::check_field;
use crate::error::{AppError, AppResult};
use crate::store::EntityStore;

/// Warehouse service for storage locations
#[derive(Clone)]
pub struct WarehouseService {
    store: Arc<dyn EntityStore>,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWarehouseInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Generated from the name when absent
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateWarehouseInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub code: Option<String>,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// List warehouses ordered by name
    pub async fn list(&self) -> AppResult<Vec<Warehouse>> {
        let mut tx = self.store.begin().await?;
        let warehouses = tx.list_warehouses().await?;
        tx.commit().await?;
        Ok(warehouses)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Warehouse> {
        let mut tx = self.store.begin().await?;
        let warehouse = tx
            .get_warehouse(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;
        tx.commit().await?;
        Ok(warehouse)
    }

    /// Create a warehouse, generating a code such as `DC003` when none is given
    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let existing = tx.list_warehouses().await?;

        let code = match input.code {
            Some(code) => {
                let code = code.trim().to_uppercase();
                check_field("code", shared::validate_warehouse_code(&code))?;
                code
            }
            None => {
                // Skip ordinals whose code is taken after earlier deletions
                let taken: HashSet<&str> = existing.iter().map(|w| w.code.as_str()).collect();
                let mut ordinal = existing.len() + 1;
                let mut code = Warehouse::generate_code(&input.name, ordinal);
                while taken.contains(code.as_str()) {
                    ordinal += 1;
                    code = Warehouse::generate_code(&input.name, ordinal);
                }
                code
            }
        };

        if existing.iter().any(|w| w.code == code) {
            return Err(AppError::validation(
                "code",
                "Warehouse code is already in use",
                "El código de depósito ya está en uso",
            ));
        }

        let now = Utc::now();
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: input.name,
            code,
            created_at: now,
            updated_at: now,
        };
        tx.insert_warehouse(&warehouse).await?;
        tx.commit().await?;

        tracing::info!("Created warehouse {} ({})", warehouse.name, warehouse.code);
        Ok(warehouse)
    }

    pub async fn update(&self, id: Uuid, input: UpdateWarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let mut warehouse = tx
            .get_warehouse(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        if let Some(name) = input.name {
            warehouse.name = name;
        }
        if let Some(code) = input.code {
            let code = code.trim().to_uppercase();
            check_field("code", shared::validate_warehouse_code(&code))?;
            let in_use = tx
                .list_warehouses()
                .await?
                .iter()
                .any(|w| w.id != id && w.code == code);
            if in_use {
                return Err(AppError::validation(
                    "code",
                    "Warehouse code is already in use",
                    "El código de depósito ya está en uso",
                ));
            }
            warehouse.code = code;
        }
        warehouse.updated_at = Utc::now();

        if !tx.update_warehouse(&warehouse).await? {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        tx.commit().await?;

        Ok(warehouse)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_warehouse(id).await? {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        tx.commit().await?;
        Ok(())
    }
}
