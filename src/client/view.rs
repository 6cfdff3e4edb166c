//! Displayed lookup state.
//!
//! One user action issues one current-conditions fetch and one forecast
//! fetch under a single request id. The pair is only shown if no newer action
//! started while it was in flight.

use std::sync::Arc;

use super::sequence::LatestOnly;
use super::{ClientError, CurrentConditions, ProxyClient};
use crate::models::LocationQuery;
use crate::services::aggregate::DailyBucket;

/// Result of both fetches for one query.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub query: LocationQuery,
    pub current: Result<CurrentConditions, Arc<ClientError>>,
    pub forecast: Result<Vec<DailyBucket>, Arc<ClientError>>,
}

impl Lookup {
    pub fn is_complete(&self) -> bool {
        self.current.is_ok() && self.forecast.is_ok()
    }
}

/// The lookup currently on screen, updated only by the latest search.
#[derive(Debug)]
pub struct WeatherView {
    client: ProxyClient,
    shown: LatestOnly<Lookup>,
}

impl WeatherView {
    pub fn new(client: ProxyClient) -> Self {
        Self {
            client,
            shown: LatestOnly::new(),
        }
    }

    /// Fetch current conditions and forecast for `query` concurrently.
    ///
    /// Returns the lookup if it became the displayed state, or `None` when a
    /// later search superseded it before both responses arrived.
    pub async fn search(&self, query: &LocationQuery) -> Option<Lookup> {
        let id = self.shown.begin();

        let (current, forecast) =
            tokio::join!(self.client.current(query), self.client.forecast(query));

        let lookup = Lookup {
            query: query.clone(),
            current: current
                .and_then(|body| CurrentConditions::from_body(&body))
                .map_err(Arc::new),
            forecast: forecast.map_err(Arc::new),
        };

        if self.shown.publish(id, lookup.clone()).await {
            Some(lookup)
        } else {
            tracing::info!("Discarding superseded lookup for {}", query);
            None
        }
    }

    /// The displayed lookup, if any search has completed.
    pub async fn shown(&self) -> Option<Lookup> {
        self.shown.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body(name: &str) -> serde_json::Value {
        json!({
            "coord": { "lon": 2.35, "lat": 48.85 },
            "weather": [{ "description": "nuageux" }],
            "main": { "temp": 14.0, "humidity": 60 },
            "name": name
        })
    }

    fn forecast_body() -> serde_json::Value {
        json!({
            "list": [
                { "dt": 1744070400, "main": { "temp": 10.0, "humidity": 80 }, "weather": [{ "description": "a" }] }
            ]
        })
    }

    async fn mount_city(server: &MockServer, city: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("city", city))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(current_body(city))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("city", city))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(forecast_body())
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_single_search_is_shown() {
        let server = MockServer::start().await;
        mount_city(&server, "Paris", Duration::ZERO).await;

        let view = WeatherView::new(ProxyClient::new(&server.uri()));
        let lookup = view
            .search(&LocationQuery::City("Paris".to_string()))
            .await
            .unwrap();
        assert!(lookup.is_complete());
        assert_eq!(lookup.forecast.as_ref().unwrap().len(), 1);

        let shown = view.shown().await.unwrap();
        assert_eq!(shown.query, LocationQuery::City("Paris".to_string()));
    }

    #[tokio::test]
    async fn test_slow_earlier_search_does_not_overwrite_newer() {
        let server = MockServer::start().await;
        mount_city(&server, "Paris", Duration::from_millis(300)).await;
        mount_city(&server, "Lyon", Duration::ZERO).await;

        let view = WeatherView::new(ProxyClient::new(&server.uri()));
        let paris = LocationQuery::City("Paris".to_string());
        let lyon = LocationQuery::City("Lyon".to_string());

        // Paris is polled first and takes its id before Lyon starts.
        let (slow, fast) = tokio::join!(view.search(&paris), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            view.search(&lyon).await
        });

        assert!(slow.is_none());
        assert!(fast.is_some());

        let shown = view.shown().await.unwrap();
        assert_eq!(shown.query, lyon);
        assert_eq!(
            shown.current.as_ref().unwrap().name.as_deref(),
            Some("Lyon")
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_is_still_shown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })),
            )
            .mount(&server)
            .await;

        let view = WeatherView::new(ProxyClient::new(&server.uri()));
        let lookup = view
            .search(&LocationQuery::City("Paris".to_string()))
            .await
            .unwrap();
        assert!(!lookup.is_complete());
        match &lookup.current {
            Err(e) => assert!(matches!(**e, ClientError::Status { status: 500, .. })),
            Ok(current) => panic!("expected an error, got {:?}", current),
        }
    }
}
