//! Weather providers.

use async_trait::async_trait;
use bookshelf_kernel::settings::WeatherSettings;
use serde::Deserialize;
use thiserror::Error;

use super::models::WeatherSummary;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather API key is not configured")]
    MissingApiKey,

    #[error("weather provider request failed")]
    Http(#[from] reqwest::Error),

    #[error("weather provider returned no conditions for '{0}'")]
    MissingCondition(String),
}

/// Source of current weather for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherSummary, WeatherError>;
}

/// Current-weather payload as returned by OpenWeatherMap; fields not listed
/// here are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentWeather {
    name: String,
    main: MainReadings,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

impl CurrentWeather {
    pub(crate) fn summarize(self, units: &str) -> Result<WeatherSummary, WeatherError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::MissingCondition(self.name.clone()))?;

        Ok(WeatherSummary {
            temperature: format!("{}{}", self.main.temp, unit_suffix(units)),
            city: self.name,
            condition: condition.description,
        })
    }
}

/// Display suffix for the provider's unit systems
fn unit_suffix(units: &str) -> &'static str {
    match units {
        "imperial" => "°F",
        "standard" => "K",
        _ => "°C",
    }
}

/// Client for the OpenWeatherMap current-weather endpoint
pub struct OpenWeatherClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(settings: &WeatherSettings) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bookshelf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/weather", settings.base_url.trim_end_matches('/')),
            api_key: settings.api_key().map(str::to_string),
            units: settings.units.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherSummary, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        let payload: CurrentWeather = self
            .http
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", self.units.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        payload.summarize(&self.units)
    }
}
