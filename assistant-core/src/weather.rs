use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::Config;
use crate::error::AssistantError;
use crate::model::WeatherRecord;
use crate::tool::Tool;

const CURRENT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Current-conditions lookup against OpenWeatherMap.
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    api_key: String,
    http: Client,
}

impl WeatherLookup {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        // An absent key is sent as-is; the service answers 401 and that
        // status is surfaced through the normal error path.
        Self::new(config.weather_api_key.clone().unwrap_or_default())
    }

    /// Fetch current weather for a free-text location. The location is
    /// passed through as a query parameter; spelling and locale are the
    /// API's problem.
    pub async fn fetch(&self, location: &str) -> Result<WeatherRecord, AssistantError> {
        let res = self
            .http
            .get(CURRENT_WEATHER_URL)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| AssistantError::ExternalService(format!("request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            AssistantError::ExternalService(format!("failed to read response body: {e}"))
        })?;

        normalize(status, &body)
    }
}

/// Turn a raw status + body pair into a weather record. Only a successful
/// status ever yields a record.
fn normalize(status: StatusCode, body: &str) -> Result<WeatherRecord, AssistantError> {
    if !status.is_success() {
        return Err(AssistantError::ExternalService(format!(
            "weather request failed with status {}: {}",
            status.as_u16(),
            truncate_body(body),
        )));
    }

    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| AssistantError::DataFormat(format!("weather response JSON: {e}")))?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| {
            AssistantError::DataFormat("weather response contained no conditions".to_string())
        })?;

    Ok(WeatherRecord {
        location: parsed.name,
        country: parsed.sys.country,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        description,
        wind_speed_mps: parsed.wind.speed,
    })
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl Tool for WeatherLookup {
    fn name(&self) -> &str {
        "weather_tool"
    }

    fn description(&self) -> &str {
        "Use this tool to get current weather information for a specific location"
    }

    async fn invoke(&self, input: &str) -> Result<String, AssistantError> {
        let record = self.fetch(input).await?;
        Ok(record.to_payload())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS_BODY: &str = r#"{
        "name": "Paris",
        "sys": {"country": "FR"},
        "main": {"temp": 15.0, "feels_like": 14.2, "humidity": 70},
        "weather": [{"description": "light rain"}],
        "wind": {"speed": 3.5}
    }"#;

    #[test]
    fn ok_response_yields_field_exact_record() {
        let record = normalize(StatusCode::OK, PARIS_BODY).expect("200 body must normalize");

        assert_eq!(record.location, "Paris");
        assert_eq!(record.country, "FR");
        assert!((record.temperature_c - 15.0).abs() < f64::EPSILON);
        assert!((record.feels_like_c - 14.2).abs() < f64::EPSILON);
        assert_eq!(record.humidity_pct, 70);
        assert_eq!(record.description, "light rain");
        assert!((record.wind_speed_mps - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_success_status_embeds_the_code() {
        let err = normalize(StatusCode::NOT_FOUND, r#"{"message":"city not found"}"#)
            .expect_err("404 must not build a record");

        let msg = err.to_string();
        assert!(msg.contains("404"), "status code missing from: {msg}");
        assert!(matches!(err, AssistantError::ExternalService(_)));
    }

    #[test]
    fn unauthorized_status_embeds_the_code() {
        let err = normalize(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid API key"}"#)
            .expect_err("401 must not build a record");

        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn empty_conditions_array_is_a_format_error() {
        let body = r#"{
            "name": "Paris",
            "sys": {"country": "FR"},
            "main": {"temp": 15.0, "feels_like": 14.2, "humidity": 70},
            "weather": [],
            "wind": {"speed": 3.5}
        }"#;

        let err = normalize(StatusCode::OK, body).expect_err("no conditions must fail");
        assert!(matches!(err, AssistantError::DataFormat(_)));
    }

    #[test]
    fn missing_field_is_a_format_error() {
        // `main` section absent entirely.
        let body = r#"{
            "name": "Paris",
            "sys": {"country": "FR"},
            "weather": [{"description": "light rain"}],
            "wind": {"speed": 3.5}
        }"#;

        let err = normalize(StatusCode::OK, body).expect_err("missing main must fail");
        assert!(matches!(err, AssistantError::DataFormat(_)));
    }

    #[test]
    fn record_payload_round_trips_for_the_next_tool() {
        let record = normalize(StatusCode::OK, PARIS_BODY).expect("200 body must normalize");
        let payload = record.to_payload();

        let parsed = WeatherRecord::from_payload(&payload).expect("payload must parse back");
        assert_eq!(parsed.location, "Paris");
        assert_eq!(parsed.humidity_pct, 70);
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let long = format!("{{\"message\":\"{}\"}}", "x".repeat(400));
        let err = normalize(StatusCode::BAD_GATEWAY, &long).expect_err("502 must fail");

        assert!(err.to_string().len() < 300);
    }
}
