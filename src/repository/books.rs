//! Book persistence

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use super::{push_ordering, push_page, BooksRepository, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        listing::{contains_pattern, prefix_pattern},
    },
};

const BOOK_COLUMNS: &str = "b.id, b.title, b.author_id, b.category_id, b.published_date";

const BOOK_JOINS: &str = " FROM books b \
     JOIN authors a ON a.id = b.author_id \
     JOIN categories c ON c.id = b.category_id";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &BookQuery) {
    builder.push(" WHERE 1=1");

    if let Some(ref title) = query.title {
        builder.push(" AND b.title = ");
        builder.push_bind(title.clone());
    }
    if let Some(ref part) = query.title_contains {
        builder.push(" AND b.title ILIKE ");
        builder.push_bind(contains_pattern(part));
    }
    if let Some(author) = query.author {
        builder.push(" AND b.author_id = ");
        builder.push_bind(author);
    }
    if let Some(category) = query.category {
        builder.push(" AND b.category_id = ");
        builder.push_bind(category);
    }
    if let Some(date) = query.published_date {
        builder.push(" AND b.published_date = ");
        builder.push_bind(date);
    }
    if let Some(date) = query.published_after {
        builder.push(" AND b.published_date >= ");
        builder.push_bind(date);
    }
    if let Some(date) = query.published_before {
        builder.push(" AND b.published_date <= ");
        builder.push_bind(date);
    }
    if let Some(ref prefix) = query.search {
        let pattern = prefix_pattern(prefix);
        builder.push(" AND (b.title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR a.name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR c.name ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

fn select_query(query: &BookQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {}{}", BOOK_COLUMNS, BOOK_JOINS));
    push_filters(&mut builder, query);
    push_ordering(&mut builder, &query.sort_keys(), "b.id");
    push_page(&mut builder, query.page());
    builder
}

fn count_query(query: &BookQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*){}", BOOK_JOINS));
    push_filters(&mut builder, query);
    builder
}

#[async_trait]
impl BooksRepository for Repository {
    /// Search books with pagination
    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let mut count = count_query(query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = select_query(query);
        let books = select.build_query_as::<Book>().fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, category_id, published_date FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn existing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM books WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(found)
    }

    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, category_id, published_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author_id, category_id, published_date
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(data.category_id)
        .bind(data.published_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author_id = COALESCE($3, author_id),
                category_id = COALESCE($4, category_id),
                published_date = COALESCE($5, published_date)
            WHERE id = $1
            RETURNING id, title, author_id, category_id, published_date
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.author_id)
        .bind(data.category_id)
        .bind(data.published_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Deleting a book also removes it from every collection (ON DELETE CASCADE)
    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
