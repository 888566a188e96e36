//! Product category service

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::models::Category;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn EntityStore>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let mut tx = self.store.begin().await?;
        let categories = tx.list_categories().await?;
        tx.commit().await?;
        Ok(categories)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Category> {
        let mut tx = self.store.begin().await?;
        let category = tx
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;
        tx.commit().await?;
        Ok(category)
    }

    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        tx.insert_category(&category).await?;
        tx.commit().await?;

        Ok(category)
    }

    pub async fn update(&self, id: Uuid, input: UpdateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let mut category = tx
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        if let Some(name) = input.name {
            category.name = name;
        }
        if let Some(description) = input.description {
            category.description = description;
        }
        category.updated_at = Utc::now();

        if !tx.update_category(&category).await? {
            return Err(AppError::NotFound("Category".to_string()));
        }
        tx.commit().await?;

        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_category(id).await? {
            return Err(AppError::NotFound("Category".to_string()));
        }
        tx.commit().await?;
        Ok(())
    }
}
