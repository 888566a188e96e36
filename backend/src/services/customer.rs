//! Customer service

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::models::Customer;
use uuid::Uuid;
use validator::Validate;

use super::check_field;
use crate::error::{AppError, AppResult};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn EntityStore>,
}

/// Input for creating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCustomerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        let mut tx = self.store.begin().await?;
        let customers = tx.list_customers().await?;
        tx.commit().await?;
        Ok(customers)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Customer> {
        let mut tx = self.store.begin().await?;
        let customer = tx
            .get_customer(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;
        tx.commit().await?;
        Ok(customer)
    }

    pub async fn create(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        input.validate()?;
        if !input.phone.is_empty() {
            check_field("phone", shared::validate_phone(&input.phone))?;
        }

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            name: input.name,
            address: input.address,
            phone: input.phone,
            email: input.email.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        tx.insert_customer(&customer).await?;
        tx.commit().await?;

        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, input: UpdateCustomerInput) -> AppResult<Customer> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let mut customer = tx
            .get_customer(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        if let Some(name) = input.name {
            customer.name = name;
        }
        if let Some(address) = input.address {
            customer.address = address;
        }
        if let Some(phone) = input.phone {
            if !phone.is_empty() {
                check_field("phone", shared::validate_phone(&phone))?;
            }
            customer.phone = phone;
        }
        if let Some(email) = input.email {
            customer.email = email;
        }
        customer.updated_at = Utc::now();

        if !tx.update_customer(&customer).await? {
            return Err(AppError::NotFound("Customer".to_string()));
        }
        tx.commit().await?;

        Ok(customer)
    }

    /// Delete a customer. Existing sales orders keep the customer name.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_customer(id).await? {
            return Err(AppError::NotFound("Customer".to_string()));
        }
        tx.commit().await?;
        Ok(())
    }
}
