//! Open-Meteo HTTP adapters for forecast and geocoding lookups.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::WeatherError;
use crate::types::{ForecastSnapshot, PlaceMatch};

const FORECAST_BASE: &str = "https://api.open-meteo.com";
const GEOCODING_BASE: &str = "https://geocoding-api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Forecast fields requested from the API. Keep in sync with the serde
/// shape of [`ForecastSnapshot`].
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,surface_pressure,apparent_temperature";
const HOURLY_FIELDS: &str = "temperature_2m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min";

/// Geocoding response envelope; a missing `results` field means no matches.
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<PlaceMatch>>,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    forecast_base: String,
    geocoding_base: String,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_base_urls(FORECAST_BASE, GEOCODING_BASE)
    }

    /// Client with overridden endpoints (mock servers in tests).
    pub fn with_base_urls(
        forecast_base: &str,
        geocoding_base: &str,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            forecast_base: forecast_base.trim_end_matches('/').to_string(),
            geocoding_base: geocoding_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the current/hourly/daily forecast for the given coordinates.
    pub async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastSnapshot, WeatherError> {
        let url = format!("{}/v1/forecast", self.forecast_base);
        let response = self
            .client
            .get(&url)
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .query(&[
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Remote(response.status().as_u16()));
        }

        let snapshot: ForecastSnapshot = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Search places by (already transliterated) name. An absent `results`
    /// field is normalized to an empty list, never an error.
    pub async fn search_places(&self, name_latin: &str) -> Result<Vec<PlaceMatch>, WeatherError> {
        let url = format!("{}/v1/search", self.geocoding_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("name", name_latin),
                ("count", "10"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Remote(response.status().as_u16()));
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;
        Ok(body.results.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "current": {
                "temperature_2m": 21.4,
                "relative_humidity_2m": 63,
                "weather_code": 2,
                "wind_speed_10m": 4.2,
                "surface_pressure": 1013.2,
                "apparent_temperature": 19.8
            },
            "hourly": {
                "time": ["2026-08-06T14:00", "2026-08-06T15:00"],
                "temperature_2m": [21.4, 22.1]
            },
            "daily": {
                "time": ["2026-08-06"],
                "temperature_2m_max": [24.3],
                "temperature_2m_min": [13.1]
            }
        })
    }

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::with_base_urls(&server.uri(), &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_forecast_parses_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "52.23"))
            .and(query_param("longitude", "21.01"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let snapshot = client.fetch_forecast(52.23, 21.01).await.unwrap();

        assert_eq!(snapshot.current.temperature, 21.4);
        assert_eq!(snapshot.current.humidity, 63);
        assert_eq!(snapshot.hourly.time.len(), 2);
        let daily = snapshot.daily.unwrap();
        assert_eq!(daily.max_temps, vec![24.3]);
    }

    #[tokio::test]
    async fn test_fetch_forecast_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_forecast(52.23, 21.01).await.unwrap_err();
        assert!(matches!(err, WeatherError::Remote(503)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_rejects_mismatched_series() {
        let server = MockServer::start().await;

        let mut body = forecast_body();
        body["hourly"]["temperature_2m"] = serde_json::json!([21.4]);
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_forecast(52.23, 21.01).await.unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_garbled_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_forecast(52.23, 21.01).await.unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[tokio::test]
    async fn test_search_places_parses_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "berlin"))
            .and(query_param("count", "10"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"name": "Berlin", "latitude": 52.52, "longitude": 13.41,
                     "country": "Germany", "admin1": "Berlin"},
                    {"name": "Berlin", "latitude": 44.47, "longitude": -71.19}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let results = client.search_places("berlin").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].country, "Germany");
        assert_eq!(results[0].region.as_deref(), Some("Berlin"));
        // Missing country/admin1 fields decode to empty defaults.
        assert_eq!(results[1].country, "");
        assert!(results[1].region.is_none());
    }

    #[tokio::test]
    async fn test_search_places_absent_results_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generationtime_ms": 0.5
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let results = client.search_places("nowhere").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_places_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.search_places("berlin").await.unwrap_err();
        assert!(matches!(err, WeatherError::Remote(429)));
    }
}
