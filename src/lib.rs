//! Bookshelf application library
//!
//! Hosts the books and weather modules and the startup sequence that wires
//! them onto the module kernel.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::DbModule;
use bookshelf_kernel::{InitCtx, ModuleRegistry, Settings};

/// Re-export commonly used types
pub use modules::*;

/// Connect, migrate, serve until shutdown, then stop every module.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let ctx = InitCtx {
        settings: &settings,
    };

    let db = Arc::new(DbModule::new());
    let mut registry = ModuleRegistry::new();
    registry.register_core(db.clone())?;
    registry.init_core_modules(&ctx).await?;

    modules::register_all(&mut registry, &db, &settings)?;

    db.apply_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    registry.init_custom_modules(&ctx).await?;
    registry.start_all(&ctx).await?;

    let app = bookshelf_http::build_router(&registry, &settings);
    let served = bookshelf_http::start_server(app, &settings).await;

    let stopped = registry.stop_all().await;
    served?;
    stopped
}
