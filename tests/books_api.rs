//! Books routes driven through the full application router.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use bookshelf_app::books::{
    self, Book, BookPatch, BookRepository, BookStoreError, InMemoryBookRepository, NewBook,
};
use serde_json::{json, Value};

use common::{app, send};

fn in_memory_app() -> axum::Router {
    app(vec![books::create_module(Arc::new(InMemoryBookRepository::new()))])
}

fn dune() -> Value {
    json!({ "title": "Dune", "author": "Herbert", "year": 1965, "genre": "SciFi" })
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|book| book["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn create_returns_created_book_with_id() {
    let app = in_memory_app();

    let (status, body) = send(&app, Method::POST, "/books", Some(dune())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["title"], "Dune");
    assert_eq!(body["author"], "Herbert");
    assert_eq!(body["year"], 1965);
    assert_eq!(body["genre"], "SciFi");
}

#[tokio::test]
async fn create_without_required_field_is_rejected() {
    let app = in_memory_app();
    let mut payload = dune();
    payload.as_object_mut().unwrap().remove("genre");

    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Book validation failed: genre is required" }));

    let (_, list) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn create_with_empty_title_is_rejected() {
    let app = in_memory_app();
    let mut payload = dune();
    payload["title"] = json!("");

    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book validation failed: title must not be empty");
}

#[tokio::test]
async fn create_with_non_integer_year_is_rejected() {
    let app = in_memory_app();
    let mut payload = dune();
    payload["year"] = json!("nineteen sixty-five");

    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("year"));
}

#[tokio::test]
async fn create_with_malformed_json_is_rejected() {
    let app = in_memory_app();
    let request = axum::http::Request::post("/books")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"title\": "))
        .unwrap();

    let (status, body) = common::send_request(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn create_without_json_content_type_is_rejected() {
    let app = in_memory_app();
    let request = axum::http::Request::post("/books")
        .body(axum::body::Body::from(dune().to_string()))
        .unwrap();

    let (status, body) = common::send_request(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn list_contains_created_book_exactly_once() {
    let app = in_memory_app();
    let (_, first) = send(&app, Method::POST, "/books", Some(dune())).await;
    let (_, second) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "Emma", "author": "Austen", "year": 1815, "genre": "Classic" })),
    )
    .await;

    let (status, list) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    let ids = ids(&list);
    let first_id = first["id"].as_str().unwrap();
    assert_eq!(ids.iter().filter(|id| id.as_str() == first_id).count(), 1);
    assert_eq!(ids, vec![first_id, second["id"].as_str().unwrap()]);
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let app = in_memory_app();
    let (_, created) = send(&app, Method::POST, "/books", Some(dune())).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(json!({ "year": 2020 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["year"], 2020);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Dune");
    assert_eq!(updated["author"], "Herbert");
    assert_eq!(updated["genre"], "SciFi");
}

#[tokio::test]
async fn update_with_empty_body_returns_current_record() {
    let app = in_memory_app();
    let (_, created) = send(&app, Method::POST, "/books", Some(dune())).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::PUT, &format!("/books/{id}"), Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let app = in_memory_app();

    for id in ["65f1c2a9e4b0a1b2c3d4e5f6", "not-an-id"] {
        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/books/{id}"),
            Some(json!({ "year": 2020 })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Book not found" }));
    }
}

#[tokio::test]
async fn update_with_empty_author_is_rejected() {
    let app = in_memory_app();
    let (_, created) = send(&app, Method::POST, "/books", Some(dune())).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(json!({ "author": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book validation failed: author must not be empty");
}

#[tokio::test]
async fn delete_removes_book_and_is_idempotent() {
    let app = in_memory_app();
    let (_, created) = send(&app, Method::POST, "/books", Some(dune())).await;
    let uri = format!("/books/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (_, list) = send(&app, Method::GET, "/books", None).await;
    assert!(ids(&list).is_empty());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, _) = send(&app, Method::DELETE, "/books/not-an-id", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn dune_lifecycle() {
    let app = in_memory_app();

    let (status, created) = send(&app, Method::POST, "/books", Some(dune())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created]));

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(json!({ "year": 1966 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        updated,
        json!({ "id": id, "title": "Dune", "author": "Herbert", "year": 1966, "genre": "SciFi" })
    );

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (_, list) = send(&app, Method::GET, "/books", None).await;
    assert!(!ids(&list).contains(&id));
}

/// Repository whose store is unreachable.
struct UnreachableStore;

fn unreachable_store() -> BookStoreError {
    BookStoreError::backend(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused by 10.0.0.7:27017",
    ))
}

#[async_trait]
impl BookRepository for UnreachableStore {
    async fn list(&self) -> Result<Vec<Book>, BookStoreError> {
        Err(unreachable_store())
    }

    async fn create(&self, _book: NewBook) -> Result<Book, BookStoreError> {
        Err(unreachable_store())
    }

    async fn update(&self, _id: &str, _patch: BookPatch) -> Result<Option<Book>, BookStoreError> {
        Err(unreachable_store())
    }

    async fn delete(&self, _id: &str) -> Result<bool, BookStoreError> {
        Err(unreachable_store())
    }
}

#[tokio::test]
async fn store_failures_map_to_generic_messages() {
    let app = app(vec![books::create_module(Arc::new(UnreachableStore))]);
    let id = "65f1c2a9e4b0a1b2c3d4e5f6";

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Server error" }));

    let (status, body) = send(&app, Method::POST, "/books", Some(dune())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Server error" }));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(json!({ "year": 1966 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Update error" }));

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Deletion error" }));
}

/// Repository whose store validator rejects every write.
struct StrictStore;

const STORE_MESSAGE: &str = "Book validation failed: Document failed validation";

#[async_trait]
impl BookRepository for StrictStore {
    async fn list(&self) -> Result<Vec<Book>, BookStoreError> {
        Ok(Vec::new())
    }

    async fn create(&self, _book: NewBook) -> Result<Book, BookStoreError> {
        Err(BookStoreError::Validation(STORE_MESSAGE.to_string()))
    }

    async fn update(&self, _id: &str, _patch: BookPatch) -> Result<Option<Book>, BookStoreError> {
        Err(BookStoreError::Validation(STORE_MESSAGE.to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<bool, BookStoreError> {
        Ok(false)
    }
}

#[tokio::test]
async fn store_validation_message_is_passed_through() {
    let app = app(vec![books::create_module(Arc::new(StrictStore))]);

    let (status, body) = send(&app, Method::POST, "/books", Some(dune())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": STORE_MESSAGE }));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books/65f1c2a9e4b0a1b2c3d4e5f6",
        Some(json!({ "title": "Dune" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": STORE_MESSAGE }));
}

#[tokio::test]
async fn openapi_document_describes_book_routes() {
    let app = in_memory_app();

    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Book Management API");
    assert!(doc["paths"]["/books"]["get"].is_object());
    assert!(doc["paths"]["/books"]["post"].is_object());
    assert!(doc["paths"]["/books/{id}"]["put"].is_object());
    assert!(doc["paths"]["/books/{id}"]["delete"].is_object());
    assert!(doc["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn health_check_is_served() {
    let app = in_memory_app();
    let request = axum::http::Request::get("/healthz")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
