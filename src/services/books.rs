//! Book service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::{AuthorsRepository, BooksRepository, CategoriesRepository},
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BooksRepository>,
    authors: Arc<dyn AuthorsRepository>,
    categories: Arc<dyn CategoriesRepository>,
}

impl BooksService {
    pub fn new(
        books: Arc<dyn BooksRepository>,
        authors: Arc<dyn AuthorsRepository>,
        categories: Arc<dyn CategoriesRepository>,
    ) -> Self {
        Self {
            books,
            authors,
            categories,
        }
    }

    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        query.validate()?;
        self.books.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.books.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()?;
        self.check_references(Some(data.author_id), Some(data.category_id))
            .await?;

        let book = self.books.create(data).await?;
        tracing::info!(book_id = book.id, "Book created");
        Ok(book)
    }

    pub async fn replace(&self, id: i32, data: CreateBook) -> AppResult<Book> {
        self.update(id, &UpdateBook::from(data)).await
    }

    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        data.validate()?;
        // Missing book wins over a bad reference
        self.books.get_by_id(id).await?;
        self.check_references(data.author_id, data.category_id).await?;
        self.books.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    /// Referenced author and category must exist
    async fn check_references(
        &self,
        author_id: Option<i32>,
        category_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(author_id) = author_id {
            if !self.authors.exists(author_id).await? {
                return Err(AppError::Validation(format!(
                    "Author {} does not exist",
                    author_id
                )));
            }
        }
        if let Some(category_id) = category_id {
            if !self.categories.exists(category_id).await? {
                return Err(AppError::Validation(format!(
                    "Category {} does not exist",
                    category_id
                )));
            }
        }
        Ok(())
    }
}
