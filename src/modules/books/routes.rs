//! HTTP handlers for the books routes.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bookshelf_http::error::{AppError, ErrorBody};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::models::{Book, BookFields, BookPatch, NewBook};
use super::repo::{BookRepository, BookStoreError};

pub(crate) type SharedRepository = Arc<dyn BookRepository>;

/// Confirmation body returned by delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

pub(crate) fn router(repository: SharedRepository) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_books, create_book))
        .routes(routes!(update_book, delete_book))
        .with_state(repository)
}

/// List every book
#[utoipa::path(
    get,
    path = "/books",
    tag = "Books",
    responses(
        (status = 200, description = "All books in store order", body = Vec<Book>),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_books(
    State(repository): State<SharedRepository>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = repository
        .list()
        .await
        .map_err(|err| AppError::internal("Server error", err))?;
    Ok(Json(books))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "Books",
    request_body = BookFields,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing or invalid field", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_book(
    State(repository): State<SharedRepository>,
    payload: Result<Json<BookFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(fields) = payload?;
    let book = NewBook::try_from(fields).map_err(|err| AppError::validation(err.to_string()))?;

    match repository.create(book).await {
        Ok(book) => {
            tracing::info!(id = %book.id, "book created");
            Ok((StatusCode::CREATED, Json(book)))
        }
        Err(BookStoreError::Validation(message)) => Err(AppError::validation(message)),
        Err(err) => Err(AppError::internal("Server error", err)),
    }
}

/// Update fields of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = String, Path, description = "Book identifier")),
    request_body = BookFields,
    responses(
        (status = 200, description = "Book after the update", body = Book),
        (status = 400, description = "Invalid field or store failure", body = ErrorBody),
        (status = 404, description = "No book has this identifier", body = ErrorBody)
    )
)]
pub async fn update_book(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
    payload: Result<Json<BookFields>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(fields) = payload?;
    let patch = BookPatch::try_from(fields).map_err(|err| AppError::validation(err.to_string()))?;

    match repository.update(&id, patch).await {
        Ok(Some(book)) => {
            tracing::info!(id = %book.id, "book updated");
            Ok(Json(book))
        }
        Ok(None) => Err(AppError::not_found("Book not found")),
        Err(BookStoreError::Validation(message)) => Err(AppError::validation(message)),
        Err(err) => Err(AppError::bad_request_from("Update error", err)),
    }
}

/// Delete a book
///
/// Succeeds whether or not the identifier named a stored book.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Deletion confirmed", body = MessageResponse),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_book(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = repository
        .delete(&id)
        .await
        .map_err(|err| AppError::internal("Deletion error", err))?;

    tracing::info!(id = %id, removed, "book delete handled");
    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}
