//! HTTP routing and OpenAPI documentation configuration.
//!
//! Registers the weather endpoints with their OpenAPI specifications via
//! utoipa and serves Swagger UI at `/api/docs`.

use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::{controller, model::app::AppState};

/// Builds the application's HTTP router with all API endpoints and Swagger UI
/// documentation.
///
/// # Registered Endpoints
/// - `GET /api/weather/{city}` - Resolve current weather for a city
/// - `GET /api/weather/{city}/preview` - Resolve without persisting or caching
pub fn routes() -> Router<AppState> {
    #[derive(OpenApi)]
    #[openapi(info(title = "Stratus", description = "Stratus weather API"), tags(
        (name = controller::weather::WEATHER_TAG, description = "Weather lookup API routes"),
    ))]
    struct ApiDoc;

    let (routes, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(controller::weather::get_weather))
        .routes(routes!(controller::weather::preview_weather))
        .split_for_parts();

    routes.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", api))
}
