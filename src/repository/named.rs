//! Shared queries for `(id, name)` tables (authors, categories)

use sqlx::{postgres::PgRow, FromRow, Pool, Postgres, QueryBuilder};

use super::{push_ordering, push_page};
use crate::{
    error::{AppError, AppResult},
    models::listing::{contains_pattern, prefix_pattern, NameQuery},
};

/// Table metadata; `label` is used in error messages
#[derive(Clone, Copy)]
pub(super) struct NamedTable {
    pub table: &'static str,
    pub label: &'static str,
}

pub(super) const AUTHORS: NamedTable = NamedTable {
    table: "authors",
    label: "Author",
};

pub(super) const CATEGORIES: NamedTable = NamedTable {
    table: "categories",
    label: "Category",
};

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &NameQuery) {
    builder.push(" WHERE 1=1");
    if let Some(ref name) = query.name {
        builder.push(" AND name = ");
        builder.push_bind(name.clone());
    }
    if let Some(ref part) = query.name_contains {
        builder.push(" AND name ILIKE ");
        builder.push_bind(contains_pattern(part));
    }
    if let Some(ref prefix) = query.search {
        builder.push(" AND name ILIKE ");
        builder.push_bind(prefix_pattern(prefix));
    }
}

pub(super) fn select_query(t: NamedTable, query: &NameQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT id, name FROM {}", t.table));
    push_filters(&mut builder, query);
    push_ordering(&mut builder, &query.sort_keys(), "id");
    push_page(&mut builder, query.page());
    builder
}

pub(super) fn count_query(t: NamedTable, query: &NameQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", t.table));
    push_filters(&mut builder, query);
    builder
}

pub(super) async fn list<T>(
    pool: &Pool<Postgres>,
    t: NamedTable,
    query: &NameQuery,
) -> AppResult<(Vec<T>, i64)>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count = count_query(t, query);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = select_query(t, query);
    let rows = select.build_query_as::<T>().fetch_all(pool).await?;

    Ok((rows, total))
}

pub(super) async fn get_by_id<T>(pool: &Pool<Postgres>, t: NamedTable, id: i32) -> AppResult<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    sqlx::query_as::<_, T>(&format!("SELECT id, name FROM {} WHERE id = $1", t.table))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", t.label, id)))
}

pub(super) async fn exists(pool: &Pool<Postgres>, t: NamedTable, id: i32) -> AppResult<bool> {
    let found: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
        t.table
    ))
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(found)
}

pub(super) async fn create<T>(pool: &Pool<Postgres>, t: NamedTable, name: &str) -> AppResult<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let row = sqlx::query_as::<_, T>(&format!(
        "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
        t.table
    ))
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn update<T>(
    pool: &Pool<Postgres>,
    t: NamedTable,
    id: i32,
    name: Option<&str>,
) -> AppResult<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    sqlx::query_as::<_, T>(&format!(
        "UPDATE {} SET name = COALESCE($2, name) WHERE id = $1 RETURNING id, name",
        t.table
    ))
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("{} {} not found", t.label, id)))
}

pub(super) async fn delete(pool: &Pool<Postgres>, t: NamedTable, id: i32) -> AppResult<()> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", t.table))
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("{} {} not found", t.label, id)));
    }
    Ok(())
}
