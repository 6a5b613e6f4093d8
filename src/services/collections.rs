//! Collection service
//!
//! Every operation takes the caller's [`Identity`]. Listing is scoped to the
//! caller, creation stamps the caller as owner, and writes on an existing
//! collection go through the ownership policy before touching the store.

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::collection::{
        normalize_book_ids, Collection, CollectionQuery, CreateCollection, UpdateCollection,
    },
    policy::{ensure_can_mutate, Identity},
    repository::{BooksRepository, CollectionsRepository},
};

#[derive(Clone)]
pub struct CollectionsService {
    collections: Arc<dyn CollectionsRepository>,
    books: Arc<dyn BooksRepository>,
}

impl CollectionsService {
    pub fn new(
        collections: Arc<dyn CollectionsRepository>,
        books: Arc<dyn BooksRepository>,
    ) -> Self {
        Self { collections, books }
    }

    /// Collections owned by the caller
    pub async fn list(
        &self,
        identity: &Identity,
        query: &CollectionQuery,
    ) -> AppResult<(Vec<Collection>, i64)> {
        query.validate()?;
        self.collections
            .list_for_owner(identity.user_id, query)
            .await
    }

    /// Any authenticated caller may read any collection by id
    pub async fn get_by_id(&self, id: i32) -> AppResult<Collection> {
        self.collections.get_by_id(id).await
    }

    pub async fn create(
        &self,
        identity: &Identity,
        mut data: CreateCollection,
    ) -> AppResult<Collection> {
        data.validate()?;
        data.books = self.checked_books(data.books).await?;

        let collection = self.collections.create(identity.user_id, &data).await?;
        tracing::info!(
            collection_id = collection.id,
            owner = identity.user_id,
            "Collection created"
        );
        Ok(collection)
    }

    /// Full replacement (PUT)
    pub async fn replace(
        &self,
        identity: &Identity,
        id: i32,
        data: CreateCollection,
    ) -> AppResult<Collection> {
        self.update(identity, id, UpdateCollection::from(data)).await
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: i32,
        mut data: UpdateCollection,
    ) -> AppResult<Collection> {
        data.validate()?;
        self.authorize(identity, id, "update").await?;

        if let Some(books) = data.books.take() {
            data.books = Some(self.checked_books(books).await?);
        }

        let collection = self.collections.update(id, &data).await?;
        tracing::info!(collection_id = id, owner = identity.user_id, "Collection updated");
        Ok(collection)
    }

    pub async fn delete(&self, identity: &Identity, id: i32) -> AppResult<()> {
        self.authorize(identity, id, "delete").await?;
        self.collections.delete(id).await?;
        tracing::info!(collection_id = id, owner = identity.user_id, "Collection deleted");
        Ok(())
    }

    /// Load the collection (404 if absent) and apply the ownership policy
    async fn authorize(&self, identity: &Identity, id: i32, action: &str) -> AppResult<Collection> {
        let collection = self.collections.get_by_id(id).await?;
        if let Err(err) = ensure_can_mutate(identity, &collection) {
            tracing::warn!(
                collection_id = id,
                owner = collection.owner,
                requester = identity.user_id,
                "Denied collection {}",
                action
            );
            return Err(err);
        }
        Ok(collection)
    }

    /// Deduplicate book ids and make sure every one of them exists
    async fn checked_books(&self, books: Vec<i32>) -> AppResult<Vec<i32>> {
        let books = normalize_book_ids(books);
        if books.is_empty() {
            return Ok(books);
        }

        let existing = self.books.existing_ids(&books).await?;
        let missing: Vec<String> = books
            .iter()
            .filter(|id| !existing.contains(id))
            .map(|id| id.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Unknown book id(s): {}",
                missing.join(", ")
            )));
        }
        Ok(books)
    }
}
