pub mod books;
pub mod weather;

use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::DbModule;
use bookshelf_kernel::{ModuleRegistry, Settings};

/// Register all project-specific modules with the registry
///
/// The database module must already be initialized.
pub fn register_all(
    registry: &mut ModuleRegistry,
    db: &DbModule,
    settings: &Settings,
) -> anyhow::Result<()> {
    let books = books::MongoBookRepository::new(&db.database()?);
    registry.register_custom(books::create_module(Arc::new(books)))?;

    let weather = weather::OpenWeatherClient::new(&settings.weather)
        .context("failed to build weather client")?;
    registry.register_custom(weather::create_module(Arc::new(weather)))?;

    Ok(())
}
