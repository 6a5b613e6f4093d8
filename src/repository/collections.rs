//! Collection persistence
//!
//! A collection row plus its `collection_books` membership rows. Writes that
//! touch both run in a single transaction.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Transaction};

use super::{push_ordering, push_page, CollectionsRepository, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        collection::{Collection, CollectionQuery, CreateCollection, UpdateCollection},
        listing::{contains_pattern, prefix_pattern},
    },
};

const COLLECTION_COLUMNS: &str = "c.id, c.name, c.description, c.owner_id AS owner, \
     ARRAY(SELECT cb.book_id FROM collection_books cb \
           WHERE cb.collection_id = c.id ORDER BY cb.book_id) AS books";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, owner_id: i32, query: &CollectionQuery) {
    builder.push(" WHERE c.owner_id = ");
    builder.push_bind(owner_id);

    if let Some(ref name) = query.name {
        builder.push(" AND c.name = ");
        builder.push_bind(name.clone());
    }
    if let Some(ref part) = query.name_contains {
        builder.push(" AND c.name ILIKE ");
        builder.push_bind(contains_pattern(part));
    }
    if let Some(ref prefix) = query.search {
        let pattern = prefix_pattern(prefix);
        builder.push(" AND (c.name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR c.description ILIKE ");
        builder.push_bind(pattern);
        // Owner username is a substring match, not a prefix
        builder.push(
            " OR EXISTS (SELECT 1 FROM users u WHERE u.id = c.owner_id AND u.username ILIKE ",
        );
        builder.push_bind(contains_pattern(prefix));
        builder.push("))");
    }
}

fn select_query(owner_id: i32, query: &CollectionQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::new(format!("SELECT {} FROM collections c", COLLECTION_COLUMNS));
    push_filters(&mut builder, owner_id, query);
    push_ordering(&mut builder, &query.sort_keys(), "c.id");
    push_page(&mut builder, query.page());
    builder
}

fn count_query(owner_id: i32, query: &CollectionQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM collections c");
    push_filters(&mut builder, owner_id, query);
    builder
}

/// Replace the book set of a collection inside `tx`
async fn replace_books(
    tx: &mut Transaction<'_, Postgres>,
    collection_id: i32,
    books: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM collection_books WHERE collection_id = $1")
        .bind(collection_id)
        .execute(&mut **tx)
        .await?;

    if !books.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO collection_books (collection_id, book_id)
            SELECT $1, UNNEST($2::int4[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(collection_id)
        .bind(books)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl CollectionsRepository for Repository {
    async fn list_for_owner(
        &self,
        owner_id: i32,
        query: &CollectionQuery,
    ) -> AppResult<(Vec<Collection>, i64)> {
        let mut count = count_query(owner_id, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = select_query(owner_id, query);
        let collections = select
            .build_query_as::<Collection>()
            .fetch_all(&self.pool)
            .await?;

        Ok((collections, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Collection> {
        let sql = format!("SELECT {} FROM collections c WHERE c.id = $1", COLLECTION_COLUMNS);
        sqlx::query_as::<_, Collection>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", id)))
    }

    async fn create(&self, owner_id: i32, data: &CreateCollection) -> AppResult<Collection> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO collections (name, description, owner_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_books(&mut tx, id, &data.books).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn update(&self, id: i32, data: &UpdateCollection) -> AppResult<Collection> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE collections SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Collection {} not found", id)));
        }

        if let Some(ref books) = data.books {
            replace_books(&mut tx, id, books).await?;
        }
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Collection {} not found", id)));
        }
        Ok(())
    }
}
