//! Category service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppResult,
    models::category::{Category, CategoryQuery, CreateCategory, UpdateCategory},
    repository::CategoriesRepository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Arc<dyn CategoriesRepository>,
}

impl CategoriesService {
    pub fn new(repository: Arc<dyn CategoriesRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &CategoryQuery) -> AppResult<(Vec<Category>, i64)> {
        query.validate()?;
        self.repository.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        self.repository.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        data.validate()?;
        let category = self.repository.create(data).await?;
        tracing::info!(category_id = category.id, "Category created");
        Ok(category)
    }

    pub async fn replace(&self, id: i32, data: CreateCategory) -> AppResult<Category> {
        self.update(id, &UpdateCategory::from(data)).await
    }

    pub async fn update(&self, id: i32, data: &UpdateCategory) -> AppResult<Category> {
        data.validate()?;
        self.repository.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.delete(id).await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}
