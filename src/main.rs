// Weather Lookup API v0.1
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use weather_lookup::config::AppConfig;
use weather_lookup::routes::{self, AppState};
use weather_lookup::{errors, services};

/// Weather Lookup API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Lookup API",
        version = "0.1.0",
        description = "Thin proxy in front of OpenWeatherMap. Looks up current conditions \
            and the 5-day forecast by city name or coordinates and relays the provider's \
            JSON unchanged, plus a daily view of the forecast.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Weather", description = "Current conditions and forecasts"),
    ),
    paths(
        routes::health::health_check,
        routes::weather::get_weather,
        routes::weather::get_forecast,
        routes::weather::get_daily_forecast,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::weather::DailyForecastResponse,
            services::aggregate::DailyBucket,
            services::aggregate::ForecastEntry,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_lookup=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        "Forwarding to {} (units={}, lang={})",
        config.provider_base_url,
        config.units,
        config.lang
    );

    let app = routes::router(AppState::new(&config))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
