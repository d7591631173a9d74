pub mod memory;
pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

pub use memory::MemoryBookStore;
pub use models::{Book, BookUpdate, NewBook};
pub use store::{BookStore, PgBookStore, SharedStore, StoreError};

/// The ISBN-keyed book catalog, mounted at `/books`
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.database.ensure_schema {
            self.store
                .ensure_schema()
                .await
                .context("failed to create books table")?;
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "book": { "$ref": "#/components/schemas/Book" }
                            },
                            "required": ["book"]
                        }
                    }
                }
            })
        };
        let isbn_param = json!({
            "name": "isbn",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let string_field = |description: &str| json!({ "type": "string", "description": description });
        let integer_field =
            |description: &str| json!({ "type": "integer", "format": "int32", "description": description });

        let mut book_properties = json!({
            "amazon_url": string_field("Store page for the book"),
            "author": string_field("Author of the book"),
            "language": string_field("Language the book is written in"),
            "pages": integer_field("Page count"),
            "publisher": string_field("Publisher of the book"),
            "title": string_field("Title of the book"),
            "year": integer_field("Year of publication")
        });
        let update_properties = book_properties.clone();
        book_properties["isbn"] = string_field("International Standard Book Number; primary key");

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every stored book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "books": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/Book" }
                                                }
                                            },
                                            "required": ["books"]
                                        }
                                    }
                                }
                            },
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "responses": {
                            "201": book_response("Created book"),
                            "400": error_response("Validation error"),
                            "409": error_response("ISBN already exists")
                        }
                    }
                },
                "/{isbn}": {
                    "get": {
                        "summary": "Get a book by ISBN",
                        "tags": ["Books"],
                        "parameters": [isbn_param.clone()],
                        "responses": {
                            "200": book_response("The book"),
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace every non-key field of a book",
                        "tags": ["Books"],
                        "parameters": [isbn_param.clone()],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookUpdate" }
                                }
                            }
                        },
                        "responses": {
                            "200": book_response("Updated book"),
                            "400": error_response("Validation error"),
                            "404": error_response("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [isbn_param],
                        "responses": {
                            "200": {
                                "description": "Book deleted",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "message": { "type": "string" }
                                            },
                                            "required": ["message"]
                                        }
                                    }
                                }
                            },
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": book_properties,
                        "required": [
                            "isbn", "amazon_url", "author", "language",
                            "pages", "publisher", "title", "year"
                        ]
                    },
                    "BookUpdate": {
                        "type": "object",
                        "properties": update_properties,
                        "required": [
                            "amazon_url", "author", "language",
                            "pages", "publisher", "title", "year"
                        ]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.close().await;
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module over `store`
pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
