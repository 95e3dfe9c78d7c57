//! MongoDB client lifecycle and migration tooling.
//!
//! [`DbModule`] is registered as the `db` core module. It opens the single
//! process-wide client during `init`, hands out [`mongodb::Database`] handles
//! to the modules that need one, and shuts the client down on `stop`.

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use bookshelf_kernel::{settings::DatabaseSettings, InitCtx, Migration, Module};
use mongodb::{
    bson::{doc, DateTime, Document},
    error::{Error as MongoError, ErrorKind},
    Client, Collection, Database,
};
use once_cell::sync::OnceCell;

/// Collection recording applied migrations
pub const MIGRATIONS_COLLECTION: &str = "_migrations";

/// Server error code for "collection already exists"
const NAMESPACE_EXISTS: i32 = 48;

/// Core module owning the MongoDB client
pub struct DbModule {
    handle: OnceCell<DbHandle>,
}

#[derive(Clone)]
struct DbHandle {
    client: Client,
    database: Database,
}

impl DbModule {
    pub const fn new() -> Self {
        Self {
            handle: OnceCell::new(),
        }
    }

    /// Database handle; fails until `init` has connected
    pub fn database(&self) -> anyhow::Result<Database> {
        self.handle
            .get()
            .map(|handle| handle.database.clone())
            .ok_or_else(|| anyhow!("database module has not been initialized"))
    }

    /// Apply every migration not yet recorded in [`MIGRATIONS_COLLECTION`],
    /// in the order given
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> anyhow::Result<()> {
        let database = self.database()?;
        let ledger: Collection<Document> = database.collection(MIGRATIONS_COLLECTION);

        for (module, migration) in migrations {
            let key = doc! { "module": module.as_str(), "id": migration.id };
            let applied = ledger
                .find_one(key.clone())
                .await
                .with_context(|| format!("failed to read migration ledger for '{}'", module))?;
            if applied.is_some() {
                tracing::debug!(module = %module, migration = migration.id, "migration already applied");
                continue;
            }

            let command = parse_command(migration.up).with_context(|| {
                format!("migration {}/{} is not a valid command", module, migration.id)
            })?;

            match database.run_command(command).await {
                Ok(_) => {
                    tracing::info!(module = %module, migration = migration.id, "migration applied")
                }
                Err(err) if command_code(&err) == Some(NAMESPACE_EXISTS) => tracing::warn!(
                    module = %module,
                    migration = migration.id,
                    "collection already exists, recording migration as applied"
                ),
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("migration {}/{} failed", module, migration.id)
                    });
                }
            }

            let mut record = key;
            record.insert("applied_at", DateTime::now());
            ledger
                .insert_one(record)
                .await
                .with_context(|| format!("failed to record migration {}/{}", module, migration.id))?;
        }

        Ok(())
    }
}

impl Default for DbModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.handle.get().is_some() {
            bail!("database module is already initialized");
        }

        let handle = connect(&ctx.settings.database).await?;
        if self.handle.set(handle).is_err() {
            bail!("database module was initialized concurrently");
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if let Some(handle) = self.handle.get() {
            handle.client.clone().shutdown().await;
            tracing::info!(target: "bookshelf-db", "database client shut down");
        }
        Ok(())
    }
}

async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DbHandle> {
    let client = Client::with_uri_str(&settings.uri)
        .await
        .context("invalid MongoDB connection string")?;

    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(&settings.name));

    database
        .run_command(doc! { "ping": 1 })
        .await
        .with_context(|| format!("failed to reach MongoDB database '{}'", database.name()))?;

    tracing::info!(
        target: "bookshelf-db",
        database = database.name(),
        "connected to MongoDB"
    );

    Ok(DbHandle { client, database })
}

/// Parse a migration body (a JSON command document) into BSON
fn parse_command(up: &str) -> anyhow::Result<Document> {
    let value: serde_json::Value = serde_json::from_str(up)?;
    if !value.is_object() {
        bail!("expected a JSON object");
    }
    let command = mongodb::bson::to_document(&value)?;
    if command.is_empty() {
        bail!("expected a non-empty JSON object");
    }
    Ok(command)
}

/// Server error code carried by a failed command, if any
pub fn command_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}
