use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::model::{
    api::{ErrorDto, WeatherDto},
    app::AppState,
};

pub static WEATHER_TAG: &str = "weather";

/// Get current weather for a city
#[utoipa::path(
    get,
    path = "/api/weather/{city}",
    tag = WEATHER_TAG,
    params(
        ("city" = String, Path, description = "City name to look up")
    ),
    responses(
        (status = 200, description = "Current weather for the city", body = WeatherDto),
        (status = 404, description = "No weather data available for the city", body = ErrorDto)
    ),
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> impl IntoResponse {
    match state.lookup.resolve(&city).await {
        Some(reading) => (
            StatusCode::OK,
            axum::Json(WeatherDto {
                city: reading.location_name,
                temp_c: reading.temp_c,
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(ErrorDto {
                error: format!("No weather data available for {city}"),
            }),
        )
            .into_response(),
    }
}

/// Get current weather for a city without persisting or caching it
#[utoipa::path(
    get,
    path = "/api/weather/{city}/preview",
    tag = WEATHER_TAG,
    params(
        ("city" = String, Path, description = "City name to look up")
    ),
    responses(
        (status = 200, description = "Current weather for the city", body = WeatherDto),
        (status = 404, description = "No weather data available for the city", body = ErrorDto)
    ),
)]
pub async fn preview_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> impl IntoResponse {
    match state.lookup.resolve_without_persisting(&city).await {
        Some(reading) => (
            StatusCode::OK,
            axum::Json(WeatherDto {
                city: reading.location_name,
                temp_c: reading.temp_c,
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(ErrorDto {
                error: format!("No weather data available for {city}"),
            }),
        )
            .into_response(),
    }
}
