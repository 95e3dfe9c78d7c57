//! Book store gateway: CRUD routes over the `Book` collection.

pub mod models;
pub mod mongo;
pub mod repo;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Migration, Module};
use utoipa_axum::router::OpenApiRouter;

pub use models::{Book, BookFields, BookPatch, NewBook};
pub use mongo::MongoBookRepository;
pub use repo::{BookRepository, BookStoreError, InMemoryBookRepository};

/// Books module serving `/books` from the injected repository
pub struct BooksModule {
    repository: Arc<dyn BookRepository>,
}

impl BooksModule {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> OpenApiRouter {
        routes::router(self.repository.clone())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_book_collection",
            up: mongo::CREATE_COLLECTION,
        }]
    }
}

/// Create a new instance of the books module
pub fn create_module(repository: Arc<dyn BookRepository>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(repository))
}
