use async_trait::async_trait;
use utoipa_axum::router::OpenApiRouter;

/// Shared state handed to every lifecycle hook
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A one-shot schema change contributed by a module
///
/// `up` is a JSON database command document, executed once and recorded
/// under `(module, id)`.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A unit of the bookshelf service with its own routes and lifecycle
///
/// Hooks run in this order: `init` (core modules, then custom modules),
/// migrations, `start`, and on shutdown `stop` in reverse order.
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key; must be unique across core and custom modules
    fn name(&self) -> &'static str;

    /// Acquire resources; a failure aborts startup
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Documented routes, merged at the server root
    ///
    /// `#[utoipa::path]` annotations on the handlers feed the generated
    /// OpenAPI document.
    fn routes(&self) -> OpenApiRouter {
        OpenApiRouter::new()
    }

    /// Migrations in the order they must run
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Begin background work once migrations are applied
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release resources during shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
