use serde::{Deserialize, Serialize};

/// A catalogued book, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Primary key; never changes after creation
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// Payload for creating a book. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// Replacement values for every non-key field of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

impl From<NewBook> for Book {
    fn from(new: NewBook) -> Self {
        Self {
            isbn: new.isbn,
            amazon_url: new.amazon_url,
            author: new.author,
            language: new.language,
            pages: new.pages,
            publisher: new.publisher,
            title: new.title,
            year: new.year,
        }
    }
}

impl Book {
    /// Overwrite every non-key field, keeping the ISBN.
    pub fn apply(&mut self, update: BookUpdate) {
        self.amazon_url = update.amazon_url;
        self.author = update.author;
        self.language = update.language;
        self.pages = update.pages;
        self.publisher = update.publisher;
        self.title = update.title;
        self.year = update.year;
    }
}
