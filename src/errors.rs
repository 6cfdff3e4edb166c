use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Message returned for every provider failure on the current-conditions route.
pub const WEATHER_FAILURE_MESSAGE: &str = "Failed to retrieve weather data.";
/// Message returned for every provider failure on the forecast routes.
pub const FORECAST_FAILURE_MESSAGE: &str = "Failed to retrieve weather forecast.";

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Provider status and reason, when the provider answered at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The provider could not be reached or answered with a failure.
    /// `message` is what the caller sees; `detail` carries the provider's
    /// own status/reason when one exists.
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        detail: Option<String>,
    },

    /// The provider answered 2xx but without the forecast `list` field.
    #[error("Forecast data missing: {0}")]
    MissingForecastData(String),
}

impl AppError {
    pub fn upstream(message: &str, detail: Option<String>) -> Self {
        AppError::Upstream {
            message: message.to_string(),
            detail,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Upstream { message, detail } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, detail)
            }
            AppError::MissingForecastData(msg) => {
                tracing::error!("Provider response lacks forecast list: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Forecast data missing from provider response.".to_string(),
                    None,
                )
            }
        };

        (
            status,
            axum::Json(ErrorResponse {
                error: message,
                detail,
            }),
        )
            .into_response()
    }
}

impl From<crate::models::QueryError> for AppError {
    fn from(err: crate::models::QueryError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
