//! MongoDB-backed book repository.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::ReturnDocument,
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::models::{Book, BookPatch, NewBook};
use super::repo::{BookRepository, BookStoreError};

/// Collection holding book documents
pub const COLLECTION: &str = "Book";

/// Server error code for a document rejected by the collection validator
const DOCUMENT_VALIDATION_FAILURE: i32 = 121;

/// Creates the `Book` collection with a validator requiring every field.
pub const CREATE_COLLECTION: &str = r#"{
    "create": "Book",
    "validator": {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["title", "author", "year", "genre"],
            "properties": {
                "title": { "bsonType": "string", "minLength": 1, "description": "title is required" },
                "author": { "bsonType": "string", "minLength": 1, "description": "author is required" },
                "year": { "bsonType": "int", "description": "year must be a 32-bit integer" },
                "genre": { "bsonType": "string", "minLength": 1, "description": "genre is required" }
            }
        }
    },
    "validationLevel": "strict",
    "validationAction": "error"
}"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    author: String,
    year: i32,
    genre: String,
}

impl From<NewBook> for BookDocument {
    fn from(book: NewBook) -> Self {
        Self {
            id: None,
            title: book.title,
            author: book.author,
            year: book.year,
            genre: book.genre,
        }
    }
}

impl BookDocument {
    fn into_book(self, id: ObjectId) -> Book {
        Book {
            id: id.to_hex(),
            title: self.title,
            author: self.author,
            year: self.year,
            genre: self.genre,
        }
    }
}

impl TryFrom<BookDocument> for Book {
    type Error = BookStoreError;

    fn try_from(document: BookDocument) -> Result<Self, Self::Error> {
        let id = document
            .id
            .ok_or_else(|| BookStoreError::Backend("stored book has no _id".into()))?;
        Ok(document.into_book(id))
    }
}

/// `$set` body for the fields a patch carries
fn set_document(patch: &BookPatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(author) = &patch.author {
        set.insert("author", author.as_str());
    }
    if let Some(year) = patch.year {
        set.insert("year", year);
    }
    if let Some(genre) = &patch.genre {
        set.insert("genre", genre.as_str());
    }
    set
}

/// Code and message of a write the server rejected, if that is what failed
fn rejected_write(err: &MongoError) -> Option<(i32, &str)> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some((write.code, &write.message)),
        ErrorKind::Command(command) => Some((command.code, &command.message)),
        _ => None,
    }
}

fn store_error(err: MongoError) -> BookStoreError {
    match rejected_write(&err) {
        Some((DOCUMENT_VALIDATION_FAILURE, message)) => {
            BookStoreError::Validation(format!("Book validation failed: {message}"))
        }
        _ => BookStoreError::backend(err),
    }
}

/// Book repository over the `Book` collection
pub struct MongoBookRepository {
    books: Collection<BookDocument>,
}

impl MongoBookRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            books: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    async fn list(&self) -> Result<Vec<Book>, BookStoreError> {
        let documents: Vec<BookDocument> = self
            .books
            .find(doc! {})
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)?;

        documents.into_iter().map(Book::try_from).collect()
    }

    async fn create(&self, book: NewBook) -> Result<Book, BookStoreError> {
        let document = BookDocument::from(book);
        let inserted = self
            .books
            .insert_one(&document)
            .await
            .map_err(store_error)?;

        let id = inserted.inserted_id.as_object_id().ok_or_else(|| {
            BookStoreError::Backend("store assigned a non-ObjectId identifier".into())
        })?;
        tracing::debug!(id = %id, "book inserted");
        Ok(document.into_book(id))
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, BookStoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let filter = doc! { "_id": oid };

        let updated = if patch.is_empty() {
            self.books.find_one(filter).await
        } else {
            self.books
                .find_one_and_update(filter, doc! { "$set": set_document(&patch) })
                .return_document(ReturnDocument::After)
                .await
        }
        .map_err(store_error)?;

        updated.map(Book::try_from).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, BookStoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };

        let result = self
            .books
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count > 0)
    }
}
