//! OpenWeatherMap response shapes.

use closet_core::WeatherObservation;
use serde::Deserialize;

/// Subset of the OpenWeatherMap current-weather response we consume.
#[derive(Debug, Deserialize)]
pub struct OwmResponse {
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    pub wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    pub humidity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct OwmCondition {
    pub main: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwmWind {
    pub speed: Option<f64>,
}

/// Error body returned by OpenWeatherMap on failures.
#[derive(Debug, Deserialize)]
pub struct OwmError {
    pub cod: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl From<OwmResponse> for WeatherObservation {
    fn from(resp: OwmResponse) -> Self {
        let condition = resp.weather.first();
        WeatherObservation {
            temperature: Some(resp.main.temp.round() as i32),
            condition: condition.map(|c| c.main.clone()),
            description: condition.and_then(|c| c.description.clone()),
            humidity: resp.main.humidity,
            wind_speed: resp.wind.and_then(|w| w.speed).or(Some(0.0)),
            icon: condition.and_then(|c| c.icon.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owm_response_maps_to_observation() {
        let json = r#"{
            "main": { "temp": 27.6, "humidity": 74 },
            "weather": [{ "main": "Rain", "description": "light rain", "icon": "10d" }],
            "wind": { "speed": 3.1 }
        }"#;
        let resp: OwmResponse = serde_json::from_str(json).unwrap();
        let obs: WeatherObservation = resp.into();
        assert_eq!(obs.temperature, Some(28));
        assert_eq!(obs.condition.as_deref(), Some("Rain"));
        assert_eq!(obs.description.as_deref(), Some("light rain"));
        assert_eq!(obs.humidity, Some(74));
        assert_eq!(obs.wind_speed, Some(3.1));
        assert_eq!(obs.icon.as_deref(), Some("10d"));
    }

    #[test]
    fn test_missing_wind_defaults_to_zero() {
        let json = r#"{
            "main": { "temp": 19.4, "humidity": 60 },
            "weather": [{ "main": "Clear" }]
        }"#;
        let resp: OwmResponse = serde_json::from_str(json).unwrap();
        let obs: WeatherObservation = resp.into();
        assert_eq!(obs.temperature, Some(19));
        assert_eq!(obs.wind_speed, Some(0.0));
        assert_eq!(obs.icon, None);
    }
}
