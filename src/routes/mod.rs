pub mod health;
pub mod weather;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::services::openweather::OpenWeatherClient;

/// Shared application state for the weather endpoints.
#[derive(Debug, Clone)]
pub struct AppState {
    pub provider: OpenWeatherClient,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            provider: OpenWeatherClient::new(config),
        }
    }
}

/// Build the proxy router: weather routes, health check, CORS and request tracing.
pub fn router(state: AppState) -> Router {
    // CORS: read-only API for browser front-ends on any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let weather_routes = Router::new()
        .route("/weather", get(weather::get_weather))
        .route("/forecast", get(weather::get_forecast))
        .route("/forecast/daily", get(weather::get_daily_forecast))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(weather_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
