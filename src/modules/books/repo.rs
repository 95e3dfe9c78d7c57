//! Storage interface for books.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use tokio::sync::RwLock;

use super::models::{Book, BookPatch, NewBook};

/// Failures reported by a [`BookRepository`].
#[derive(Debug, Error)]
pub enum BookStoreError {
    /// The store refused the document; the message is safe to show clients.
    #[error("{0}")]
    Validation(String),

    #[error("book store failure")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BookStoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Storage operations behind the books routes.
///
/// Identifiers are opaque strings. An identifier that cannot name a stored
/// book (including a malformed one) behaves like an unknown identifier.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every stored book, in store order.
    async fn list(&self) -> Result<Vec<Book>, BookStoreError>;

    /// Persist a new book and return it with its assigned identifier.
    async fn create(&self, book: NewBook) -> Result<Book, BookStoreError>;

    /// Apply `patch` and return the updated book, or `None` for an unknown id.
    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, BookStoreError>;

    /// Remove the book; returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, BookStoreError>;
}

/// Insertion-ordered repository kept in process memory.
#[derive(Default)]
pub struct InMemoryBookRepository {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list(&self) -> Result<Vec<Book>, BookStoreError> {
        Ok(self.books.read().await.clone())
    }

    async fn create(&self, book: NewBook) -> Result<Book, BookStoreError> {
        let book = Book {
            id: ObjectId::new().to_hex(),
            title: book.title,
            author: book.author,
            year: book.year,
            genre: book.genre,
        };
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, BookStoreError> {
        let mut books = self.books.write().await;
        Ok(books.iter_mut().find(|book| book.id == id).map(|book| {
            patch.apply_to(book);
            book.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, BookStoreError> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|book| book.id != id);
        Ok(books.len() != before)
    }
}
