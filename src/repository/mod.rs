//! Repository layer for database operations
//!
//! Each entity has an async trait describing its persistence operations. The
//! PostgreSQL-backed [`Repository`] implements all of them; services only see
//! the traits, so any [`DataStore`] can be plugged in.

pub mod authors;
pub mod books;
pub mod categories;
pub mod collections;
mod named;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{Book, BookQuery, CreateBook, UpdateBook},
        category::{Category, CategoryQuery, CreateCategory, UpdateCategory},
        collection::{Collection, CollectionQuery, CreateCollection, UpdateCollection},
        listing::{Page, SortKey},
        user::User,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorsRepository: Send + Sync {
    async fn list(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Author>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    async fn create(&self, data: &CreateAuthor) -> AppResult<Author>;
    async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoriesRepository: Send + Sync {
    async fn list(&self, query: &CategoryQuery) -> AppResult<(Vec<Category>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Category>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    async fn create(&self, data: &CreateCategory) -> AppResult<Category>;
    async fn update(&self, id: i32, data: &UpdateCategory) -> AppResult<Category>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;
    /// The subset of `ids` that exist, ascending
    async fn existing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>>;
    async fn create(&self, data: &CreateBook) -> AppResult<Book>;
    async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionsRepository: Send + Sync {
    /// Collections owned by `owner_id` only
    async fn list_for_owner(
        &self,
        owner_id: i32,
        query: &CollectionQuery,
    ) -> AppResult<(Vec<Collection>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Collection>;
    async fn create(&self, owner_id: i32, data: &CreateCollection) -> AppResult<Collection>;
    async fn update(&self, id: i32, data: &UpdateCollection) -> AppResult<Collection>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<User>;
    /// Case-insensitive lookup
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Round-trip to the store
    async fn ping(&self) -> AppResult<()>;
}

/// Everything the services need from a store
pub trait DataStore:
    AuthorsRepository
    + CategoriesRepository
    + BooksRepository
    + CollectionsRepository
    + UsersRepository
    + StoreHealth
    + 'static
{
}

impl<T> DataStore for T where
    T: AuthorsRepository
        + CategoriesRepository
        + BooksRepository
        + CollectionsRepository
        + UsersRepository
        + StoreHealth
        + 'static
{
}

/// PostgreSQL store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Append `ORDER BY`, always ending on `tiebreaker` so pages are stable
pub(crate) fn push_ordering(
    builder: &mut QueryBuilder<'_, Postgres>,
    keys: &[SortKey],
    tiebreaker: &'static str,
) {
    let mut terms: Vec<String> = keys
        .iter()
        .map(|k| format!("{} {}", k.column, if k.descending { "DESC" } else { "ASC" }))
        .collect();
    if !keys.iter().any(|k| k.column == tiebreaker) {
        terms.push(format!("{} ASC", tiebreaker));
    }
    builder.push(" ORDER BY ");
    builder.push(terms.join(", "));
}

pub(crate) fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: Page) {
    builder.push(" LIMIT ");
    builder.push_bind(page.per_page);
    builder.push(" OFFSET ");
    builder.push_bind(page.offset());
}
