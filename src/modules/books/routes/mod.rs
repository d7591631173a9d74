//! `/books` HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use bookstore_http::error::AppError;

use super::models::Book;
use super::store::SharedStore;
use super::validation;

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: Book,
}

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Routes relative to the module mount point
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

/// GET /books
async fn list_books(State(store): State<SharedStore>) -> Result<Json<BookListResponse>, AppError> {
    let books = store.find_all().await?;
    Ok(Json(BookListResponse { books }))
}

/// GET /books/{isbn}
async fn get_book(
    State(store): State<SharedStore>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = store.find_one(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

/// POST /books
async fn create_book(
    State(store): State<SharedStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(body) = body?;
    let new_book = validation::validate_new(&body)?;

    let book = store.create(new_book).await?;
    tracing::info!(isbn = %book.isbn, "book created");

    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

/// PUT /books/{isbn}
async fn update_book(
    State(store): State<SharedStore>,
    Path(isbn): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Json(body) = body?;
    let changes = validation::validate_update(&body, &isbn)?;

    let book = store.update(&isbn, changes).await?;
    tracing::info!(isbn = %book.isbn, "book updated");

    Ok(Json(BookResponse { book }))
}

/// DELETE /books/{isbn}
async fn delete_book(
    State(store): State<SharedStore>,
    Path(isbn): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    store.remove(&isbn).await?;
    tracing::info!(isbn = %isbn, "book deleted");

    Ok(Json(MessageResponse {
        message: "Book deleted",
    }))
}
