// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Organizer edits to categories, codes and challenge texts.

use crate::db::SharedStore;
use crate::error::AppError;
use crate::models::category::DEFAULT_CATEGORY_NAME;
use crate::models::{Category, ChallengeConfig, Code};
use rand::distributions::Alphanumeric;
use rand::Rng;

const RECORD_ID_LEN: usize = 20;

/// Generate a random document ID for records without a natural key.
pub fn new_record_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RECORD_ID_LEN)
        .map(char::from)
        .collect()
}

/// Partial update of a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub scans_required: Option<u32>,
}

/// Partial update of a code. `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct CodeUpdate {
    pub name: Option<String>,
    pub category_id: Option<Option<String>>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: SharedStore,
}

impl CatalogService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a category with the default name and no threshold.
    pub async fn create_category(&self) -> Result<Category, AppError> {
        let category = Category::new(new_record_id(), DEFAULT_CATEGORY_NAME, 0);
        self.store.upsert_category(&category).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: &str,
        update: CategoryUpdate,
    ) -> Result<Category, AppError> {
        let mut category = self
            .store
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(scans_required) = update.scans_required {
            category.scans_required = scans_required;
        }

        self.store.upsert_category(&category).await?;
        Ok(category)
    }

    /// Remove a category. Its codes stay and become orphans.
    pub async fn remove_category(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_category(id).await? {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        tracing::info!(category_id = id, "Category removed");
        Ok(())
    }

    pub async fn update_code(&self, id: &str, update: CodeUpdate) -> Result<Code, AppError> {
        let mut code = self
            .store
            .get_code(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Code {} not found", id)))?;

        if let Some(name) = update.name {
            code.name = name;
        }
        if let Some(category_id) = update.category_id {
            if let Some(ref category_id) = category_id {
                if self.store.get_category(category_id).await?.is_none() {
                    return Err(AppError::BadRequest(format!(
                        "Unknown category {}",
                        category_id
                    )));
                }
            }
            code.category_id = category_id;
        }

        self.store.upsert_code(&code).await?;
        Ok(code)
    }

    pub async fn remove_code(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_code(id).await? {
            return Err(AppError::NotFound(format!("Code {} not found", id)));
        }
        tracing::info!(code_id = id, "Code removed");
        Ok(())
    }

    pub async fn set_challenge(&self, config: &ChallengeConfig) -> Result<(), AppError> {
        self.store.set_challenge(config).await
    }
}
