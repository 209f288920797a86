//! Weather tool — current conditions from Open-Meteo.
//!
//! Two requests: geocode the city name, then fetch current temperature and
//! wind speed for the coordinates. No API key needed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use opsbot_core::config::WeatherConfig;

use super::base::{require_string, Tool};

/// Coordinates of a geocoded city.
#[derive(Debug, Clone, PartialEq)]
struct Location {
    latitude: f64,
    longitude: f64,
    name: String,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: String,
}

#[derive(Deserialize, Default)]
struct ForecastResponse {
    #[serde(default)]
    current: HashMap<String, Value>,
    #[serde(default)]
    current_units: HashMap<String, Value>,
}

/// `get_weather` — current weather for a city.
pub struct WeatherTool {
    client: Client,
    geocoding_base: String,
    forecast_base: String,
}

impl WeatherTool {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            geocoding_base: config.geocoding_base.trim_end_matches('/').to_string(),
            forecast_base: config.forecast_base.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a city name to coordinates. Any failure means "not found".
    async fn locate(&self, city: &str) -> Option<Location> {
        let resp = self
            .client
            .get(format!("{}/v1/search", self.geocoding_base))
            .query(&[("name", city), ("count", "1"), ("language", "en"), ("format", "json")])
            .send()
            .await
            .ok()?;
        let body: GeocodingResponse = resp.json().await.ok()?;
        body.results.into_iter().next().map(|r| Location {
            latitude: r.latitude,
            longitude: r.longitude,
            name: r.name,
        })
    }

    async fn forecast(&self, location: &Location) -> Result<ForecastResponse, reqwest::Error> {
        self.client
            .get(format!("{}/v1/forecast", self.forecast_base))
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", "temperature_2m,weather_code,wind_speed_10m".to_string()),
            ])
            .send()
            .await?
            .json()
            .await
    }
}

fn weather_error(message: impl Into<String>) -> Value {
    json!({ "error": message.into(), "source": "get_weather" })
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather for a specific city."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city to get weather for"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let city = require_string(&params, "city")?;

        let Some(location) = self.locate(&city).await else {
            return Ok(weather_error(format!("Could not find coordinates for {city}")));
        };
        debug!(city = %location.name, lat = location.latitude, lon = location.longitude, "geocoded");

        match self.forecast(&location).await {
            Ok(data) => Ok(json!({
                "city": location.name,
                "temperature": data.current.get("temperature_2m").cloned().unwrap_or(Value::Null),
                "wind_speed": data.current.get("wind_speed_10m").cloned().unwrap_or(Value::Null),
                "unit": data
                    .current_units
                    .get("temperature_2m")
                    .cloned()
                    .unwrap_or_else(|| json!("°C")),
            })),
            Err(e) => Ok(weather_error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer) -> WeatherTool {
        WeatherTool::new(&WeatherConfig {
            geocoding_base: server.uri(),
            forecast_base: server.uri(),
            timeout_secs: 5,
        })
    }

    fn city(name: &str) -> HashMap<String, Value> {
        HashMap::from([("city".to_string(), json!(name))])
    }

    #[tokio::test]
    async fn returns_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "latitude": 51.5, "longitude": -0.12, "name": "London" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("current", "temperature_2m,weather_code,wind_speed_10m"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": { "temperature_2m": 15.2, "wind_speed_10m": 10.4, "weather_code": 3 },
                "current_units": { "temperature_2m": "°C" }
            })))
            .mount(&server)
            .await;

        let out = tool_for(&server).execute(city("London")).await.unwrap();
        assert_eq!(
            out,
            json!({ "city": "London", "temperature": 15.2, "wind_speed": 10.4, "unit": "°C" })
        );
    }

    #[tokio::test]
    async fn unknown_city_is_error_shaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let out = tool_for(&server).execute(city("Atlantis")).await.unwrap();
        assert_eq!(out["error"], "Could not find coordinates for Atlantis");
        assert_eq!(out["source"], "get_weather");
    }

    #[tokio::test]
    async fn missing_units_default_to_celsius() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "latitude": 1.0, "longitude": 2.0, "name": "Quito" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": { "temperature_2m": 20 }
            })))
            .mount(&server)
            .await;

        let out = tool_for(&server).execute(city("Quito")).await.unwrap();
        assert_eq!(out["unit"], "°C");
        assert_eq!(out["wind_speed"], Value::Null);
    }

    #[tokio::test]
    async fn missing_city_param_is_an_error() {
        let server = MockServer::start().await;
        assert!(tool_for(&server).execute(HashMap::new()).await.is_err());
    }
}
