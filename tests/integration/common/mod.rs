//! In-process test harness: an in-memory store behind the real router

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use biblioteca_server::{
    api,
    config::AppConfig,
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{Book, BookQuery, CreateBook, UpdateBook},
        category::{Category, CategoryQuery, CreateCategory, UpdateCategory},
        collection::{
            normalize_book_ids, Collection, CollectionQuery, CreateCollection, UpdateCollection,
        },
        listing::{Page, SortKey},
        user::{User, UserClaims},
    },
    repository::{
        AuthorsRepository, BooksRepository, CategoriesRepository, CollectionsRepository,
        StoreHealth, UsersRepository,
    },
    AppState,
};

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: Vec<User>,
    authors: Vec<Author>,
    categories: Vec<Category>,
    books: Vec<Book>,
    collections: Vec<Collection>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn drop_books(&mut self, removed: &[i32]) {
        self.books.retain(|b| !removed.contains(&b.id));
        for collection in &mut self.collections {
            collection.books.retain(|id| !removed.contains(id));
        }
    }
}

/// Store double with the same cascade rules as the SQL schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))
    }
}

fn not_found(kind: &str, id: i32) -> AppError {
    AppError::NotFound(format!("{} with id {} not found", kind, id))
}

fn lower_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn lower_starts_with(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().starts_with(&needle.to_lowercase())
}

/// Sort by the requested keys then id, and cut out one page
fn sort_and_page<T: Clone>(
    mut rows: Vec<T>,
    keys: &[SortKey],
    page: Page,
    compare: impl Fn(&T, &T, &str) -> Ordering,
) -> (Vec<T>, i64) {
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|k| {
                let ord = compare(a, b, k.field);
                if k.descending {
                    ord.reverse()
                } else {
                    ord
                }
            })
            .chain(std::iter::once(compare(a, b, "id")))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(page.per_page as usize)
        .collect();
    (items, total)
}

fn name_matches(name: &str, query: &AuthorQuery) -> bool {
    query.name.as_deref().map_or(true, |n| name == n)
        && query
            .name_contains
            .as_deref()
            .map_or(true, |n| lower_contains(name, n))
        && query
            .search
            .as_deref()
            .map_or(true, |s| lower_starts_with(name, s))
}

#[async_trait]
impl AuthorsRepository for MemoryStore {
    async fn list(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        let tables = self.lock()?;
        let rows = tables
            .authors
            .iter()
            .filter(|a| name_matches(&a.name, query))
            .cloned()
            .collect();
        Ok(sort_and_page(rows, &query.sort_keys(), query.page(), |a, b, f| {
            match f {
                "name" => a.name.cmp(&b.name),
                _ => a.id.cmp(&b.id),
            }
        }))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        let tables = self.lock()?;
        tables
            .authors
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found("Author", id))
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.lock()?.authors.iter().any(|a| a.id == id))
    }

    async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut tables = self.lock()?;
        let author = Author {
            id: tables.next_id(),
            name: data.name.clone(),
        };
        tables.authors.push(author.clone());
        Ok(author)
    }

    async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut tables = self.lock()?;
        let author = tables
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Author", id))?;
        if let Some(name) = &data.name {
            author.name = name.clone();
        }
        Ok(author.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.lock()?;
        if !tables.authors.iter().any(|a| a.id == id) {
            return Err(not_found("Author", id));
        }
        tables.authors.retain(|a| a.id != id);
        let removed: Vec<i32> = tables
            .books
            .iter()
            .filter(|b| b.author_id == id)
            .map(|b| b.id)
            .collect();
        tables.drop_books(&removed);
        Ok(())
    }
}

#[async_trait]
impl CategoriesRepository for MemoryStore {
    async fn list(&self, query: &CategoryQuery) -> AppResult<(Vec<Category>, i64)> {
        let tables = self.lock()?;
        let rows = tables
            .categories
            .iter()
            .filter(|c| name_matches(&c.name, query))
            .cloned()
            .collect();
        Ok(sort_and_page(rows, &query.sort_keys(), query.page(), |a, b, f| {
            match f {
                "name" => a.name.cmp(&b.name),
                _ => a.id.cmp(&b.id),
            }
        }))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        let tables = self.lock()?;
        tables
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("Category", id))
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.lock()?.categories.iter().any(|c| c.id == id))
    }

    async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let mut tables = self.lock()?;
        let category = Category {
            id: tables.next_id(),
            name: data.name.clone(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: i32, data: &UpdateCategory) -> AppResult<Category> {
        let mut tables = self.lock()?;
        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Category", id))?;
        if let Some(name) = &data.name {
            category.name = name.clone();
        }
        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.lock()?;
        if !tables.categories.iter().any(|c| c.id == id) {
            return Err(not_found("Category", id));
        }
        tables.categories.retain(|c| c.id != id);
        let removed: Vec<i32> = tables
            .books
            .iter()
            .filter(|b| b.category_id == id)
            .map(|b| b.id)
            .collect();
        tables.drop_books(&removed);
        Ok(())
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let tables = self.lock()?;
        let rows = tables
            .books
            .iter()
            .filter(|b| query.title.as_deref().map_or(true, |t| b.title == t))
            .filter(|b| {
                query
                    .title_contains
                    .as_deref()
                    .map_or(true, |t| lower_contains(&b.title, t))
            })
            .filter(|b| query.author.map_or(true, |a| b.author_id == a))
            .filter(|b| query.category.map_or(true, |c| b.category_id == c))
            .filter(|b| query.published_date.map_or(true, |d| b.published_date == d))
            .filter(|b| query.published_after.map_or(true, |d| b.published_date >= d))
            .filter(|b| query.published_before.map_or(true, |d| b.published_date <= d))
            .filter(|b| {
                query.search.as_deref().map_or(true, |s| {
                    lower_starts_with(&b.title, s)
                        || tables
                            .authors
                            .iter()
                            .any(|a| a.id == b.author_id && lower_starts_with(&a.name, s))
                        || tables
                            .categories
                            .iter()
                            .any(|c| c.id == b.category_id && lower_starts_with(&c.name, s))
                })
            })
            .cloned()
            .collect();
        Ok(sort_and_page(rows, &query.sort_keys(), query.page(), |a, b, f| {
            match f {
                "title" => a.title.cmp(&b.title),
                "author" => a.author_id.cmp(&b.author_id),
                "category" => a.category_id.cmp(&b.category_id),
                "published_date" => a.published_date.cmp(&b.published_date),
                _ => a.id.cmp(&b.id),
            }
        }))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let tables = self.lock()?;
        tables
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| not_found("Book", id))
    }

    async fn existing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let tables = self.lock()?;
        let found = ids
            .iter()
            .copied()
            .filter(|id| tables.books.iter().any(|b| b.id == *id))
            .collect();
        Ok(normalize_book_ids(found))
    }

    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tables = self.lock()?;
        let book = Book {
            id: tables.next_id(),
            title: data.title.clone(),
            author_id: data.author_id,
            category_id: data.category_id,
            published_date: data.published_date,
        };
        tables.books.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tables = self.lock()?;
        let book = tables
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| not_found("Book", id))?;
        if let Some(title) = &data.title {
            book.title = title.clone();
        }
        if let Some(author_id) = data.author_id {
            book.author_id = author_id;
        }
        if let Some(category_id) = data.category_id {
            book.category_id = category_id;
        }
        if let Some(published_date) = data.published_date {
            book.published_date = published_date;
        }
        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.lock()?;
        if !tables.books.iter().any(|b| b.id == id) {
            return Err(not_found("Book", id));
        }
        tables.drop_books(&[id]);
        Ok(())
    }
}

#[async_trait]
impl CollectionsRepository for MemoryStore {
    async fn list_for_owner(
        &self,
        owner_id: i32,
        query: &CollectionQuery,
    ) -> AppResult<(Vec<Collection>, i64)> {
        let tables = self.lock()?;
        let rows = tables
            .collections
            .iter()
            .filter(|c| c.owner == owner_id)
            .filter(|c| query.name.as_deref().map_or(true, |n| c.name == n))
            .filter(|c| {
                query
                    .name_contains
                    .as_deref()
                    .map_or(true, |n| lower_contains(&c.name, n))
            })
            .filter(|c| {
                query.search.as_deref().map_or(true, |s| {
                    lower_starts_with(&c.name, s)
                        || lower_starts_with(&c.description, s)
                        || tables
                            .users
                            .iter()
                            .any(|u| u.id == c.owner && lower_contains(&u.username, s))
                })
            })
            .cloned()
            .collect();
        Ok(sort_and_page(rows, &query.sort_keys(), query.page(), |a, b, f| {
            match f {
                "name" => a.name.cmp(&b.name),
                "description" => a.description.cmp(&b.description),
                "owner" => a.owner.cmp(&b.owner),
                _ => a.id.cmp(&b.id),
            }
        }))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Collection> {
        let tables = self.lock()?;
        tables
            .collections
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("Collection", id))
    }

    async fn create(&self, owner_id: i32, data: &CreateCollection) -> AppResult<Collection> {
        let mut tables = self.lock()?;
        let collection = Collection {
            id: tables.next_id(),
            name: data.name.clone(),
            description: data.description.clone(),
            owner: owner_id,
            books: normalize_book_ids(data.books.clone()),
        };
        tables.collections.push(collection.clone());
        Ok(collection)
    }

    async fn update(&self, id: i32, data: &UpdateCollection) -> AppResult<Collection> {
        let mut tables = self.lock()?;
        let collection = tables
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Collection", id))?;
        if let Some(name) = &data.name {
            collection.name = name.clone();
        }
        if let Some(description) = &data.description {
            collection.description = description.clone();
        }
        if let Some(books) = &data.books {
            collection.books = normalize_book_ids(books.clone());
        }
        Ok(collection.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.lock()?;
        if !tables.collections.iter().any(|c| c.id == id) {
            return Err(not_found("Collection", id));
        }
        tables.collections.retain(|c| c.id != id);
        Ok(())
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let tables = self.lock()?;
        tables
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("User", id))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut tables = self.lock()?;
        if tables
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(AppError::Conflict(format!("Username '{}' is already taken", username)));
        }
        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Application wired to a fresh in-memory store
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(AppConfig::default(), store.clone());
        Self { state, store }
    }

    /// Insert an account directly and mint a token for it
    pub async fn user(&self, username: &str) -> (i32, String) {
        let user = UsersRepository::create(self.store.as_ref(), username, "unused")
            .await
            .expect("Failed to seed user");
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp: now + 3600,
            iat: now,
        };
        let token = claims
            .create_token(&self.state.config.auth.jwt_secret)
            .expect("Failed to sign token");
        (user.id, token)
    }

    /// Send one request through the full middleware stack
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let authorization = token.map(|t| format!("Bearer {}", t));
        self.send(method, uri, authorization.as_deref(), body).await
    }

    /// Like [`TestApp::request`] with a raw `Authorization` header value
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("Failed to build request");

        let response = api::app(self.state.clone())
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response is not JSON")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }
}
