//! Weather HTTP endpoints.
//!
//! - GET /weather?city=NAME | ?lat=LAT&lon=LON
//! - GET /forecast?city=NAME | ?lat=LAT&lon=LON
//! - GET /forecast/daily?city=NAME | ?lat=LAT&lon=LON

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::models::LocationQuery;
use crate::services::aggregate::{daily_forecast, DailyBucket};
use crate::services::openweather::Endpoint;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Location parameters. Either `city`, or both `lat` and `lon`; the pair wins
/// when all three are given.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LocationParams {
    /// City name (e.g. "Paris")
    pub city: Option<String>,
    /// Latitude in degrees (e.g. "48.85")
    pub lat: Option<String>,
    /// Longitude in degrees (e.g. "2.35")
    pub lon: Option<String>,
}

impl LocationParams {
    fn to_query(&self) -> Result<LocationQuery, AppError> {
        Ok(LocationQuery::from_parts(
            self.city.as_deref(),
            self.lat.as_deref(),
            self.lon.as_deref(),
        )?)
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Forecast reduced to the first sample of each day.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyForecastResponse {
    /// Provider's resolved location name, when present
    pub city: Option<String>,
    /// One entry per calendar date, in chronological order of first appearance
    pub days: Vec<DailyBucket>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Get current conditions for a city or coordinate pair.
///
/// The provider's JSON is returned unchanged.
#[utoipa::path(
    get,
    path = "/weather",
    tag = "Weather",
    params(LocationParams),
    responses(
        (status = 200, description = "Provider current-conditions JSON, verbatim", body = serde_json::Value),
        (status = 400, description = "Neither city nor lat/lon supplied, or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Provider unreachable or returned an error", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let query = params.to_query()?;
    let body = state.provider.fetch(Endpoint::Current, &query).await?;
    Ok(Json(body))
}

/// Get the multi-day 3-hourly forecast for a city or coordinate pair.
///
/// The provider's JSON is returned unchanged.
#[utoipa::path(
    get,
    path = "/forecast",
    tag = "Weather",
    params(LocationParams),
    responses(
        (status = 200, description = "Provider forecast JSON, verbatim", body = serde_json::Value),
        (status = 400, description = "Neither city nor lat/lon supplied, or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Provider unreachable or returned an error", body = ErrorResponse),
    )
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let query = params.to_query()?;
    let body = state.provider.fetch(Endpoint::Forecast, &query).await?;
    Ok(Json(body))
}

/// Get the forecast aggregated to one sample per day.
#[utoipa::path(
    get,
    path = "/forecast/daily",
    tag = "Weather",
    params(LocationParams),
    responses(
        (status = 200, description = "First forecast sample of each day", body = DailyForecastResponse),
        (status = 400, description = "Neither city nor lat/lon supplied, or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Provider unreachable or returned an error", body = ErrorResponse),
        (status = 502, description = "Provider response lacks the forecast list", body = ErrorResponse),
    )
)]
pub async fn get_daily_forecast(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<DailyForecastResponse>, AppError> {
    let query = params.to_query()?;
    let body = state.provider.fetch(Endpoint::Forecast, &query).await?;
    let days = daily_forecast(&body)?;

    let city = body
        .get("city")
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string);

    Ok(Json(DailyForecastResponse { city, days }))
}
