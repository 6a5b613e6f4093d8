//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::listing::{parse_ordering, Page, SortKey};

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub category_id: i32,
    /// Publication date (YYYY-MM-DD)
    pub published_date: NaiveDate,
}

/// Create book request (also the full-replacement payload for PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    pub author_id: i32,
    pub category_id: i32,
    pub published_date: NaiveDate,
}

/// Update book request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub published_date: Option<NaiveDate>,
}

impl From<CreateBook> for UpdateBook {
    fn from(data: CreateBook) -> Self {
        Self {
            title: Some(data.title),
            author_id: Some(data.author_id),
            category_id: Some(data.category_id),
            published_date: Some(data.published_date),
        }
    }
}

/// Book list parameters
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact title match
    pub title: Option<String>,
    /// Case-insensitive substring match on title
    pub title_contains: Option<String>,
    /// Author ID
    pub author: Option<i32>,
    /// Category ID
    pub category: Option<i32>,
    /// Exact publication date
    pub published_date: Option<NaiveDate>,
    /// Published on or after this date
    pub published_after: Option<NaiveDate>,
    /// Published on or before this date
    pub published_before: Option<NaiveDate>,
    /// Case-insensitive prefix match on title, author name or category name
    pub search: Option<String>,
    /// Comma-separated fields (`title`, `author`, `category`, `published_date`, `id`)
    pub ordering: Option<String>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<i64>,
}

impl BookQuery {
    pub const ORDERING_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("title", "b.title"),
        ("author", "b.author_id"),
        ("category", "b.category_id"),
        ("published_date", "b.published_date"),
        ("id", "b.id"),
    ];

    pub fn page(&self) -> Page {
        Page::new(self.page, self.per_page)
    }

    pub fn sort_keys(&self) -> Vec<SortKey> {
        parse_ordering(self.ordering.as_deref(), Self::ORDERING_FIELDS)
    }
}
