//! Pagination and ordering shared by every list endpoint

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    /// Apply defaults to the raw query values; range checks happen in validation
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    /// Rows to skip; saturates so a page far past the end stays an empty page
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.per_page.max(0))
    }
}

/// List parameters for resources identified by a single `name` column
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    /// Exact name match
    pub name: Option<String>,
    /// Case-insensitive substring match on name
    pub name_contains: Option<String>,
    /// Case-insensitive prefix match on name
    pub search: Option<String>,
    /// Comma-separated fields (`name`, `id`), `-` prefix for descending
    pub ordering: Option<String>,
    /// Page number (default: 1)
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    /// Items per page (default: 20, max: 100)
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<i64>,
}

impl NameQuery {
    pub const ORDERING_FIELDS: &'static [(&'static str, &'static str)] =
        &[("name", "name"), ("id", "id")];

    pub fn page(&self) -> Page {
        Page::new(self.page, self.per_page)
    }

    pub fn sort_keys(&self) -> Vec<SortKey> {
        parse_ordering(self.ordering.as_deref(), Self::ORDERING_FIELDS)
    }
}

/// One `ORDER BY` term resolved against a whitelist of columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub column: &'static str,
    pub descending: bool,
}

/// Parse an `ordering` parameter such as `-published_date,title`.
///
/// `fields` maps public field names to SQL columns. Unknown names are skipped
/// and a field named twice keeps its first position.
pub fn parse_ordering(raw: Option<&str>, fields: &[(&'static str, &'static str)]) -> Vec<SortKey> {
    let mut keys: Vec<SortKey> = Vec::new();

    for term in raw.unwrap_or_default().split(',') {
        let term = term.trim();
        let (name, descending) = match term.strip_prefix('-') {
            Some(name) => (name, true),
            None => (term, false),
        };

        let Some(&(field, column)) = fields.iter().find(|(f, _)| *f == name) else {
            continue;
        };
        if keys.iter().any(|k| k.field == field) {
            continue;
        }
        keys.push(SortKey {
            field,
            column,
            descending,
        });
    }

    keys
}

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Pattern for a case-insensitive "contains" match
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

/// Pattern for a case-insensitive prefix match
pub fn prefix_pattern(input: &str) -> String {
    format!("{}%", escape_like(input))
}
