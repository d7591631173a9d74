//! Book persistence.
//!
//! Each operation on [`PgBookStore`] is a single statement; "not found" is
//! detected from the statement returning no row, never by a separate lookup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;

use bookstore_http::error::AppError;

use super::models::{Book, BookUpdate, NewBook};

/// Store shared between the module and its route handlers
pub type SharedStore = Arc<dyn BookStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("There is no book with an isbn '{0}'")]
    NotFound(String),

    #[error("A book with isbn '{0}' already exists")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::not_found(err.to_string()),
            StoreError::Duplicate(ref isbn) => AppError::conflict(
                vec![json!({ "field": "isbn", "value": isbn })],
                err.to_string(),
            ),
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

/// CRUD over the `books` table
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new book; fails with [`StoreError::Duplicate`] if the ISBN exists.
    async fn create(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Every stored book in storage order.
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    async fn find_one(&self, isbn: &str) -> Result<Book, StoreError>;

    /// Overwrite every non-key field of the book at `isbn`.
    async fn update(&self, isbn: &str, changes: BookUpdate) -> Result<Book, StoreError>;

    async fn remove(&self, isbn: &str) -> Result<(), StoreError>;

    /// Create backing storage if it is missing.
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release connections; the store is unusable afterwards.
    async fn close(&self) {}
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error, isbn: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(isbn.to_owned());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, &book.isbn))
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn find_one(&self, isbn: &str) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(isbn.to_owned()))
    }

    async fn update(&self, isbn: &str, changes: BookUpdate) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET amazon_url = $1,
                author = $2,
                language = $3,
                pages = $4,
                publisher = $5,
                title = $6,
                year = $7
            WHERE isbn = $8
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(&changes.amazon_url)
        .bind(&changes.author)
        .bind(&changes.language)
        .bind(changes.pages)
        .bind(&changes.publisher)
        .bind(&changes.title)
        .bind(changes.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(isbn.to_owned()))
    }

    async fn remove(&self, isbn: &str) -> Result<(), StoreError> {
        let deleted: Option<(String,)> =
            sqlx::query_as("DELETE FROM books WHERE isbn = $1 RETURNING isbn")
                .bind(isbn)
                .fetch_optional(&self.pool)
                .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(isbn.to_owned()))
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                isbn TEXT PRIMARY KEY,
                amazon_url TEXT NOT NULL,
                author TEXT NOT NULL,
                language TEXT NOT NULL,
                pages INTEGER NOT NULL,
                publisher TEXT NOT NULL,
                title TEXT NOT NULL,
                year INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn close(&self) {
        bookstore_db::close(&self.pool).await;
    }
}
