use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current weather reshaped for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "city": "London", "temperature": "14.3°C", "condition": "light rain" }))]
pub struct WeatherSummary {
    /// Canonical city name reported by the provider
    pub city: String,
    /// Temperature with its unit suffix
    pub temperature: String,
    /// Description of the first reported condition
    pub condition: String,
}
