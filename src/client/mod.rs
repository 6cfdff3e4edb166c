//! Client for the proxy's HTTP API.
//!
//! The proxy relays provider JSON verbatim; this side turns it into the
//! current-conditions summary and the daily forecast.

pub mod sequence;
pub mod view;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{Coordinates, LocationQuery};
use crate::services::aggregate::{entries_from_list, group_by_day, DailyBucket};

pub use sequence::{LatestOnly, RequestId, RequestSequencer};
pub use view::{Lookup, WeatherView};

/// Default proxy location, matching the server's default port.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Proxy request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Proxy returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Forecast data missing from response")]
    MissingForecastData,
    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

/// Summary of a current-conditions body.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Provider's resolved place name
    pub name: Option<String>,
    /// Coordinates the provider resolved the query to
    pub coords: Option<Coordinates>,
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    name: Option<String>,
    coord: Option<Coordinates>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: String,
}

impl CurrentConditions {
    pub fn from_body(body: &serde_json::Value) -> Result<Self, ClientError> {
        let parsed = OwCurrent::deserialize(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(Self {
            name: parsed.name.filter(|n| !n.is_empty()),
            coords: parsed.coord,
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity,
            description: parsed
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
        })
    }
}

/// HTTP client for `/weather` and `/forecast` on the proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        query: &LocationQuery,
    ) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} for {}", url, query);

        let response = self
            .http
            .get(&url)
            .query(&query.proxy_params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProxyErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Raw current-conditions JSON for `query`.
    pub async fn current(&self, query: &LocationQuery) -> Result<serde_json::Value, ClientError> {
        self.get_json("/weather", query).await
    }

    /// Forecast for `query`, reduced to the first sample of each day.
    pub async fn forecast(&self, query: &LocationQuery) -> Result<Vec<DailyBucket>, ClientError> {
        let body = self.get_json("/forecast", query).await?;
        let list = body.get("list").ok_or_else(|| {
            tracing::error!("Forecast response has no 'list' field");
            ClientError::MissingForecastData
        })?;
        Ok(group_by_day(&entries_from_list(Some(list))))
    }
}
