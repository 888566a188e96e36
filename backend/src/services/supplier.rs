//! Supplier service

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::models::Supplier;
use uuid::Uuid;
use validator::Validate;

use super::check_field;
use crate::error::{AppError, AppResult};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn EntityStore>,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
}

impl SupplierService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Supplier>> {
        let mut tx = self.store.begin().await?;
        let suppliers = tx.list_suppliers().await?;
        tx.commit().await?;
        Ok(suppliers)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Supplier> {
        let mut tx = self.store.begin().await?;
        let supplier = tx
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;
        tx.commit().await?;
        Ok(supplier)
    }

    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        if !input.phone.is_empty() {
            check_field("phone", shared::validate_phone(&input.phone))?;
        }

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name,
            address: input.address,
            phone: input.phone,
            email: input.email.unwrap_or_default(),
            website: input.website.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        tx.insert_supplier(&supplier).await?;
        tx.commit().await?;

        Ok(supplier)
    }

    pub async fn update(&self, id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let mut supplier = tx
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        if let Some(name) = input.name {
            supplier.name = name;
        }
        if let Some(address) = input.address {
            supplier.address = address;
        }
        if let Some(phone) = input.phone {
            if !phone.is_empty() {
                check_field("phone", shared::validate_phone(&phone))?;
            }
            supplier.phone = phone;
        }
        if let Some(email) = input.email {
            supplier.email = email;
        }
        if let Some(website) = input.website {
            supplier.website = website;
        }
        supplier.updated_at = Utc::now();

        if !tx.update_supplier(&supplier).await? {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        tx.commit().await?;

        Ok(supplier)
    }

    /// Delete a supplier. Existing purchase orders keep the supplier name.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_supplier(id).await? {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        tx.commit().await?;
        Ok(())
    }
}
