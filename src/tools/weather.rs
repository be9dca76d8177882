//! Weather Tool
//!
//! Current conditions from the Visual Crossing timeline API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{http_client, Tool, ToolOutput};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};

const TIMELINE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub description: String,
    pub icon: String,
    pub humidity: f64,
    pub wind_speed: f64,
}

impl WeatherReport {
    /// Extract the fields used from a timeline response
    pub fn from_timeline(body: &Value) -> Option<Self> {
        let current = body.get("currentConditions")?;
        Some(Self {
            location: body["resolvedAddress"].as_str().unwrap_or("Unknown location").to_string(),
            temperature: current["temp"].as_f64()?.round() as i64,
            feels_like: current["feelslike"]
                .as_f64()
                .or_else(|| current["temp"].as_f64())?
                .round() as i64,
            description: current["conditions"].as_str().unwrap_or("").to_string(),
            icon: current["icon"].as_str().unwrap_or("").to_string(),
            humidity: current["humidity"].as_f64().unwrap_or(0.0),
            wind_speed: current["windspeed"].as_f64().unwrap_or(0.0),
        })
    }

    pub fn render(&self) -> String {
        format!(
            "Weather for {}:\n🌡️ Temperature: {}°C (feels like {}°C)\n🌤️ Condition: {}\n💧 Humidity: {}%\n💨 Wind Speed: {} km/h\n☁️ Icon: {}",
            self.location,
            self.temperature,
            self.feels_like,
            self.description,
            self.humidity,
            self.wind_speed,
            self.icon
        )
    }
}

/// Latitude must lie in [-90, 90] and longitude in [-180, 180]
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err("Invalid latitude or longitude coordinates".to_string());
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err("Latitude must be between -90 and 90 degrees".to_string());
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err("Longitude must be between -180 and 180 degrees".to_string());
    }
    Ok(())
}

pub struct WeatherTool {
    client: Client,
    api_key: Option<String>,
}

impl WeatherTool {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: http_client(config),
            api_key: config.visual_crossing_api_key.clone(),
        }
    }

    async fn fetch(&self, lat: f64, lon: f64) -> AgentResult<WeatherReport> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Config("Visual Crossing API key not found".to_string()))?;

        let url = format!("{}/{},{}", TIMELINE_URL, lat, lon);
        debug!("Fetching weather for {},{}", lat, lon);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("unitGroup", "metric"),
                ("include", "current"),
                ("key", api_key),
                ("contentType", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::Tool(format!(
                "Weather API Error: {}",
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        WeatherReport::from_timeline(&body)
            .ok_or_else(|| AgentError::Tool("Weather API returned no current conditions".to_string()))
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> String {
        "get_weather".to_string()
    }

    fn description(&self) -> String {
        "Get current weather information for a location using latitude and longitude coordinates"
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "lat": { "type": "number", "description": "Latitude coordinate (-90 to 90)" },
                "lon": { "type": "number", "description": "Longitude coordinate (-180 to 180)" }
            },
            "required": ["lat", "lon"]
        })
    }

    /// Readings change hour to hour
    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let lat = params["lat"].as_f64().unwrap_or(f64::NAN);
        let lon = params["lon"].as_f64().unwrap_or(f64::NAN);

        if let Err(message) = validate_coordinates(lat, lon) {
            return Ok(ToolOutput::failure(format!(
                "Error fetching weather data: {}",
                message
            )));
        }

        match self.fetch(lat, lon).await {
            Ok(report) => Ok(ToolOutput::success(serde_json::to_value(&report)?, report.render())),
            Err(e) => {
                warn!("Weather lookup failed: {}", e);
                Ok(ToolOutput::failure(format!("Error fetching weather data: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(51.5, -0.12).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert_eq!(
            validate_coordinates(91.0, 0.0).unwrap_err(),
            "Latitude must be between -90 and 90 degrees"
        );
        assert_eq!(
            validate_coordinates(0.0, -180.5).unwrap_err(),
            "Longitude must be between -180 and 180 degrees"
        );
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_parse_timeline() {
        let body = json!({
            "resolvedAddress": "London, England, United Kingdom",
            "currentConditions": {
                "temp": 12.6,
                "feelslike": 10.4,
                "conditions": "Partially cloudy",
                "icon": "partly-cloudy-day",
                "humidity": 71.2,
                "windspeed": 14.8
            }
        });
        let report = WeatherReport::from_timeline(&body).unwrap();
        assert_eq!(report.temperature, 13);
        assert_eq!(report.feels_like, 10);
        let text = report.render();
        assert!(text.starts_with("Weather for London, England, United Kingdom:"));
        assert!(text.contains("Temperature: 13°C (feels like 10°C)"));
        assert!(text.contains("Humidity: 71.2%"));

        assert!(WeatherReport::from_timeline(&json!({"days": []})).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_and_bad_input() {
        let tool = WeatherTool::new(&AgentConfig::default());

        let bad = tool.execute(json!({"lat": 120, "lon": 0})).await.unwrap();
        assert_eq!(
            bad.summary,
            "Error fetching weather data: Latitude must be between -90 and 90 degrees"
        );

        let no_key = tool.execute(json!({"lat": 10, "lon": 10})).await.unwrap();
        assert!(!no_key.success);
        assert!(no_key.summary.contains("Visual Crossing API key not found"));
    }

    #[test]
    fn test_readings_are_not_cached() {
        assert!(!WeatherTool::new(&AgentConfig::default()).cacheable());
    }
}
