//! Weather relay: reshapes the provider's current weather for a city.

pub mod models;
pub mod provider;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Module};
use utoipa_axum::router::OpenApiRouter;

pub use models::WeatherSummary;
pub use provider::{OpenWeatherClient, WeatherError, WeatherProvider};

pub struct WeatherModule {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherModule {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Module for WeatherModule {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.weather.api_key().is_none() {
            tracing::warn!(
                module = self.name(),
                "weather API key is not configured; /weather requests will fail"
            );
        }
        tracing::info!(module = self.name(), "weather module initialized");
        Ok(())
    }

    fn routes(&self) -> OpenApiRouter {
        routes::router(self.provider.clone())
    }
}

/// Create a new instance of the weather module
pub fn create_module(provider: Arc<dyn WeatherProvider>) -> Arc<dyn Module> {
    Arc::new(WeatherModule::new(provider))
}
