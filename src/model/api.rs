use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current weather for a city as served to API consumers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeatherDto {
    pub city: String,
    pub temp_c: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDto {
    pub error: String,
}
