use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bookshelf_http::error::{AppError, ErrorBody};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::models::WeatherSummary;
use super::provider::WeatherProvider;

pub(crate) type SharedProvider = Arc<dyn WeatherProvider>;

pub(crate) fn router(provider: SharedProvider) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(current_weather))
        .with_state(provider)
}

/// Current weather for a city
#[utoipa::path(
    get,
    path = "/weather/{city}",
    tag = "Weather",
    params(("city" = String, Path, description = "City name understood by the provider")),
    responses(
        (status = 200, description = "Current weather", body = WeatherSummary),
        (status = 500, description = "Provider unavailable or response unusable", body = ErrorBody)
    )
)]
pub async fn current_weather(
    State(provider): State<SharedProvider>,
    Path(city): Path<String>,
) -> Result<Json<WeatherSummary>, AppError> {
    let summary = provider
        .current(&city)
        .await
        .map_err(|err| AppError::internal("Error fetching weather data", err))?;

    tracing::debug!(city = %summary.city, "weather relayed");
    Ok(Json(summary))
}
