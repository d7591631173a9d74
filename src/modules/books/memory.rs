//! In-process [`BookStore`] with the same contract as the PostgreSQL store.
//! Used to exercise the HTTP layer without a database.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Book, BookUpdate, NewBook};
use super::store::{BookStore, StoreError};

/// Books kept in insertion order
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        if books.iter().any(|existing| existing.isbn == book.isbn) {
            return Err(StoreError::Duplicate(book.isbn));
        }

        let book = Book::from(book);
        books.push(book.clone());
        Ok(book)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.read().await.clone())
    }

    async fn find_one(&self, isbn: &str) -> Result<Book, StoreError> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.isbn == isbn)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(isbn.to_owned()))
    }

    async fn update(&self, isbn: &str, changes: BookUpdate) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        let book = books
            .iter_mut()
            .find(|book| book.isbn == isbn)
            .ok_or_else(|| StoreError::NotFound(isbn.to_owned()))?;

        book.apply(changes);
        Ok(book.clone())
    }

    async fn remove(&self, isbn: &str) -> Result<(), StoreError> {
        let mut books = self.books.write().await;
        let position = books
            .iter()
            .position(|book| book.isbn == isbn)
            .ok_or_else(|| StoreError::NotFound(isbn.to_owned()))?;

        books.remove(position);
        Ok(())
    }
}
