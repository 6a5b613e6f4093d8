//! Author service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppResult,
    models::author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
    repository::AuthorsRepository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Arc<dyn AuthorsRepository>,
}

impl AuthorsService {
    pub fn new(repository: Arc<dyn AuthorsRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        query.validate()?;
        self.repository.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.repository.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.create(data).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    /// Full replacement (PUT)
    pub async fn replace(&self, id: i32, data: CreateAuthor) -> AppResult<Author> {
        self.update(id, &UpdateAuthor::from(data)).await
    }

    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }
}
