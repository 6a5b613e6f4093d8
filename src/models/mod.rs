//! Data models for Biblioteca

pub mod author;
pub mod book;
pub mod category;
pub mod collection;
pub mod listing;
pub mod user;

use serde::{Deserialize, Deserializer};

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use category::Category;
pub use collection::Collection;
pub use listing::{Page, SortKey};
pub use user::{User, UserClaims, UserInfo};

/// Deserialize a string with surrounding whitespace removed
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Optional counterpart of [`trimmed`]; use together with `#[serde(default)]`
pub(crate) fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()))
}
