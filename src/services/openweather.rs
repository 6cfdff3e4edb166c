//! OpenWeatherMap data 2.5 client.
//!
//! Forwards current-conditions and 5-day/3-hour forecast requests and hands
//! the provider's JSON back untouched.
//! See: https://openweathermap.org/current and https://openweathermap.org/forecast5

use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::{AppError, FORECAST_FAILURE_MESSAGE, WEATHER_FAILURE_MESSAGE};
use crate::models::LocationQuery;

/// Longest provider error body echoed into logs and error details.
const MAX_DETAIL_LEN: usize = 200;

/// Provider endpoints the proxy forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Current conditions (`/weather`).
    Current,
    /// Multi-entry forecast (`/forecast`).
    Forecast,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Caller-facing message for any failure on this endpoint.
    fn failure_message(self) -> &'static str {
        match self {
            Endpoint::Current => WEATHER_FAILURE_MESSAGE,
            Endpoint::Forecast => FORECAST_FAILURE_MESSAGE,
        }
    }
}

/// Client for the OpenWeatherMap API.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    units: String,
    lang: String,
}

/// Error body OpenWeatherMap returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            units: config.units.clone(),
            lang: config.lang.clone(),
        }
    }

    /// Forward a location query to the provider and return its JSON body.
    ///
    /// Every failure (transport, non-2xx, undecodable body) is logged with the
    /// original error and mapped to `AppError::Upstream` with the endpoint's
    /// generic message.
    pub async fn fetch(
        &self,
        endpoint: Endpoint,
        query: &LocationQuery,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint.path());

        let mut params = query.provider_params();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", self.units.clone()));
        params.push(("lang", self.lang.clone()));

        tracing::debug!("Forwarding {} query for {}", endpoint.path(), query);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenWeatherMap request failed: {}", e);
                AppError::upstream(endpoint.failure_message(), None)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = provider_error_detail(status, &body);
            tracing::error!("OpenWeatherMap returned {}", detail);
            return Err(AppError::upstream(endpoint.failure_message(), Some(detail)));
        }

        response.json().await.map_err(|e| {
            tracing::error!("OpenWeatherMap JSON parse error: {}", e);
            AppError::upstream(endpoint.failure_message(), None)
        })
    }
}

/// Build a short "<status>: <reason>" string from a provider error response.
fn provider_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    let reason = serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| truncate_body(body));

    if reason.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, reason)
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_DETAIL_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenWeatherClient {
        OpenWeatherClient::new(&AppConfig {
            api_key: "test-key".to_string(),
            port: 0,
            provider_base_url: base_url.to_string(),
            units: "metric".to_string(),
            lang: "fr".to_string(),
        })
    }

    #[test]
    fn test_provider_error_detail_uses_message() {
        let detail = provider_error_detail(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"cod":"404","message":"city not found"}"#,
        );
        assert_eq!(detail, "404 Not Found: city not found");
    }

    #[test]
    fn test_provider_error_detail_plain_body() {
        let detail = provider_error_detail(reqwest::StatusCode::BAD_GATEWAY, "");
        assert_eq!(detail, "502 Bad Gateway");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_DETAIL_LEN + 10);
        let t = truncate_body(&long);
        assert_eq!(t.len(), MAX_DETAIL_LEN + 3);
        assert!(t.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn test_fetch_city_passes_through_body() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "name": "Paris", "main": { "temp": 12.3 } });
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Paris"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "fr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client
            .fetch(Endpoint::Current, &LocationQuery::City("Paris".to_string()))
            .await
            .unwrap();
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_fetch_non_success_maps_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "cod": 401, "message": "Invalid API key" })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .fetch(Endpoint::Forecast, &LocationQuery::City("Paris".to_string()))
            .await
            .unwrap_err();
        match err {
            AppError::Upstream { message, detail } => {
                assert_eq!(message, FORECAST_FAILURE_MESSAGE);
                assert_eq!(detail.as_deref(), Some("401 Unauthorized: Invalid API key"));
            }
            other => panic!("expected Upstream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_provider() {
        // Nothing listens on port 9 of localhost in the test environment.
        let client = test_client("http://127.0.0.1:9");
        let err = client
            .fetch(Endpoint::Current, &LocationQuery::City("Paris".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream { detail: None, .. }));
    }
}
