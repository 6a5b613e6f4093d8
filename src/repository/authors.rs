//! Author persistence

use async_trait::async_trait;

use super::{named, AuthorsRepository, Repository};
use crate::{
    error::AppResult,
    models::author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
};

#[async_trait]
impl AuthorsRepository for Repository {
    async fn list(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        named::list(&self.pool, named::AUTHORS, query).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        named::get_by_id(&self.pool, named::AUTHORS, id).await
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        named::exists(&self.pool, named::AUTHORS, id).await
    }

    async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        named::create(&self.pool, named::AUTHORS, &data.name).await
    }

    async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        named::update(&self.pool, named::AUTHORS, id, data.name.as_deref()).await
    }

    /// Deleting an author also deletes their books (ON DELETE CASCADE)
    async fn delete(&self, id: i32) -> AppResult<()> {
        named::delete(&self.pool, named::AUTHORS, id).await
    }
}
