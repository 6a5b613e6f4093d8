//! Category persistence

use async_trait::async_trait;

use super::{named, CategoriesRepository, Repository};
use crate::{
    error::AppResult,
    models::category::{Category, CategoryQuery, CreateCategory, UpdateCategory},
};

#[async_trait]
impl CategoriesRepository for Repository {
    async fn list(&self, query: &CategoryQuery) -> AppResult<(Vec<Category>, i64)> {
        named::list(&self.pool, named::CATEGORIES, query).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        named::get_by_id(&self.pool, named::CATEGORIES, id).await
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        named::exists(&self.pool, named::CATEGORIES, id).await
    }

    async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        named::create(&self.pool, named::CATEGORIES, &data.name).await
    }

    async fn update(&self, id: i32, data: &UpdateCategory) -> AppResult<Category> {
        named::update(&self.pool, named::CATEGORIES, id, data.name.as_deref()).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        named::delete(&self.pool, named::CATEGORIES, id).await
    }
}
