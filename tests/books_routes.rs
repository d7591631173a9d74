use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookstore_app::modules::{
    self,
    books::{BookStore, MemoryBookStore, NewBook},
};
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

const ISBN: &str = "901245678901";

fn seeded_book() -> NewBook {
    NewBook {
        isbn: ISBN.to_string(),
        amazon_url: "https://amazon.com".to_string(),
        author: "Test Author".to_string(),
        language: "English".to_string(),
        pages: 123,
        publisher: "Test Publishing".to_string(),
        title: "The Big Book About Testing".to_string(),
        year: 2000,
    }
}

fn second_book() -> Value {
    json!({
        "isbn": "987654321098",
        "amazon_url": "https://amazon.com",
        "author": "Test Author II",
        "language": "English",
        "pages": 456,
        "publisher": "Test Publishing Two",
        "title": "Another Big Book About Testing",
        "year": 2010
    })
}

fn updated_book() -> Value {
    json!({
        "amazon_url": "https://amazon.com",
        "author": "Test Author",
        "language": "English",
        "pages": 123,
        "publisher": "Test Publishing",
        "title": "Updated: The Big Book About Testing",
        "year": 2020
    })
}

/// App over a fresh in-memory store holding one book
async fn test_app() -> Router {
    let store = Arc::new(MemoryBookStore::new());
    store.create(seeded_book()).await.unwrap();

    let settings = Settings::default();
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
        .init_all(&InitCtx {
            settings: &settings,
        })
        .await
        .unwrap();

    bookstore_http::build_router(&registry, &settings)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn lists_books() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["books"][0]["isbn"], ISBN);
}

#[tokio::test]
async fn gets_one_book_by_isbn() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", &format!("/books/{ISBN}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["book"],
        json!({
            "isbn": ISBN,
            "amazon_url": "https://amazon.com",
            "author": "Test Author",
            "language": "English",
            "pages": 123,
            "publisher": "Test Publishing",
            "title": "The Big Book About Testing",
            "year": 2000
        })
    );
}

#[tokio::test]
async fn unknown_isbn_is_404_for_get_put_and_delete() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/books/1233456", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);

    let (status, _) = send(&app, "PUT", "/books/1233456", Some(updated_book())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/books/1233456", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creates_a_book_that_reads_back_unchanged() {
    let app = test_app().await;

    let (status, body) = send(&app, "POST", "/books", Some(second_book())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"]["author"], "Test Author II");

    let (status, body) = send(&app, "GET", "/books/987654321098", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"], second_book());

    let (_, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(body["books"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_required_field_is_400_naming_it() {
    let app = test_app().await;

    for field in [
        "isbn",
        "amazon_url",
        "author",
        "language",
        "pages",
        "publisher",
        "title",
        "year",
    ] {
        let mut book = second_book();
        book.as_object_mut().unwrap().remove(field);

        let (status, body) = send(&app, "POST", "/books", Some(book)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");

        let expected = json!(format!("instance requires property \"{field}\""));
        let details = body["error"]["details"].as_array().unwrap();
        assert!(details.contains(&expected), "missing {field}");
    }

    let (_, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn wrong_types_are_all_reported() {
    let app = test_app().await;

    let mut book = second_book();
    book["pages"] = json!("456");
    book["year"] = json!(2010.5);
    book["title"] = json!(null);

    let (status, body) = send(&app, "POST", "/books", Some(book)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_json_is_a_json_400() {
    let app = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/books")
        .header("content-type", "application/json")
        .body(Body::from("{\"isbn\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn duplicate_isbn_is_409() {
    let app = test_app().await;

    let mut book = second_book();
    book["isbn"] = json!(ISBN);

    let (status, body) = send(&app, "POST", "/books", Some(book)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn updates_every_field_but_the_isbn() {
    let app = test_app().await;

    let (status, body) = send(&app, "PUT", &format!("/books/{ISBN}"), Some(updated_book())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["language"], "English");

    let (_, body) = send(&app, "GET", &format!("/books/{ISBN}"), None).await;
    let mut expected = updated_book();
    expected["isbn"] = json!(ISBN);
    assert_eq!(body["book"], expected);
}

#[tokio::test]
async fn update_cannot_change_isbn() {
    let app = test_app().await;

    let mut book = updated_book();
    book["isbn"] = json!("000000000000");

    let (status, _) = send(&app, "PUT", &format!("/books/{ISBN}"), Some(book)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/books/000000000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_missing_field_is_400() {
    let app = test_app().await;

    let mut book = updated_book();
    book.as_object_mut().unwrap().remove("year");

    let (status, body) = send(&app, "PUT", &format!("/books/{ISBN}"), Some(book)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"],
        json!(["instance requires property \"year\""])
    );
}

#[tokio::test]
async fn deletes_a_book() {
    let app = test_app().await;

    let (status, body) = send(&app, "DELETE", &format!("/books/{ISBN}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, _) = send(&app, "GET", &format!("/books/{ISBN}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(body["books"], json!([]));
}

#[tokio::test]
async fn unmatched_route_is_json_404() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/authors", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn openapi_lists_book_routes() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"].is_object());
    assert!(body["paths"]["/books/{isbn}"].is_object());
}

#[tokio::test]
async fn whole_float_page_count_is_accepted() {
    let app = test_app().await;

    let mut book = second_book();
    book["pages"] = json!(456.0);

    let (status, body) = send(&app, "POST", "/books", Some(book)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"]["pages"], 456);

    let (_, body) = send(&app, "GET", "/books/987654321098", None).await;
    assert_eq!(body["book"], second_book());
}

#[tokio::test]
async fn unsupported_method_is_json_404() {
    let app = test_app().await;

    for (method, uri) in [
        ("PATCH", format!("/books/{ISBN}")),
        ("PUT", "/books".to_string()),
        ("DELETE", "/books".to_string()),
    ] {
        let (status, body) = send(&app, method, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"]["status"], 404, "{method} {uri}");
        assert!(body["error"]["message"].is_string());
    }

    let (_, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
}
