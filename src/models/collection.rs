//! Collection model: a user-owned, named grouping of books

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::listing::{parse_ordering, Page, SortKey};
use crate::policy::Owned;

/// Collection record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Collection {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// ID of the user who created the collection
    pub owner: i32,
    /// IDs of the books in the collection, ascending
    pub books: Vec<i32>,
}

impl Owned for Collection {
    fn owner_id(&self) -> i32 {
        self.owner
    }
}

/// Create collection request (also the full-replacement payload for PUT).
///
/// There is no owner field: the owner is always the caller.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCollection {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub description: String,
    #[serde(default)]
    pub books: Vec<i32>,
}

/// Update collection request; `books`, when present, replaces the whole set
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCollection {
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    pub description: Option<String>,
    pub books: Option<Vec<i32>>,
}

impl From<CreateCollection> for UpdateCollection {
    fn from(data: CreateCollection) -> Self {
        Self {
            name: Some(data.name),
            description: Some(data.description),
            books: Some(data.books),
        }
    }
}

/// Collection list parameters (results are always limited to the caller's own)
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CollectionQuery {
    /// Exact name match
    pub name: Option<String>,
    /// Case-insensitive substring match on name
    pub name_contains: Option<String>,
    /// Case-insensitive prefix match on name or description, or substring of the owner username
    pub search: Option<String>,
    /// Comma-separated fields (`name`, `description`, `owner`, `id`)
    pub ordering: Option<String>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<i64>,
}

impl CollectionQuery {
    pub const ORDERING_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("name", "c.name"),
        ("description", "c.description"),
        ("owner", "c.owner_id"),
        ("id", "c.id"),
    ];

    pub fn page(&self) -> Page {
        Page::new(self.page, self.per_page)
    }

    pub fn sort_keys(&self) -> Vec<SortKey> {
        parse_ordering(self.ordering.as_deref(), Self::ORDERING_FIELDS)
    }
}

/// Sorted, duplicate-free book IDs
pub fn normalize_book_ids(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
