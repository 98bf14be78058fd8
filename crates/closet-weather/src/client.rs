//! OpenWeatherMap HTTP client.

use std::time::Duration;

use closet_core::defaults::{WEATHER_CACHE_TTL_SECS, WEATHER_REQUEST_TIMEOUT_SECS};
use closet_core::{Error, Result, WeatherObservation};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, warn};

use crate::cache::WeatherCache;
use crate::types::{OwmError, OwmResponse};

/// Default OpenWeatherMap current-weather endpoint.
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Weather lookup client with a 5-minute in-process cache and a fallback
/// retry across location-format variants ("City", then "City, CC").
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    /// Country code appended as a retry variant when a bare city name is not
    /// found (users rarely type "Manila, PH").
    default_country: Option<String>,
    cache: WeatherCache,
}

impl WeatherClient {
    /// Create a client with the given API key and default settings.
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_config(api_key, DEFAULT_WEATHER_API_URL.to_string(), None)
    }

    /// Create a client with custom endpoint and country fallback.
    pub fn with_config(
        api_key: String,
        base_url: String,
        default_country: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEATHER_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            default_country,
            cache: WeatherCache::new(Duration::from_secs(WEATHER_CACHE_TTL_SECS)),
        })
    }

    /// Create a client from environment configuration.
    ///
    /// Reads:
    /// - `WEATHER_API_KEY` (required)
    /// - `WEATHER_API_URL` (default: the OpenWeatherMap endpoint)
    /// - `WEATHER_DEFAULT_COUNTRY` (optional retry country code, e.g. "PH")
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("WEATHER_API_KEY")
            .map_err(|_| Error::Config("WEATHER_API_KEY is not set".to_string()))?;
        let base_url =
            std::env::var("WEATHER_API_URL").unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string());
        let default_country = std::env::var("WEATHER_DEFAULT_COUNTRY")
            .ok()
            .filter(|c| !c.trim().is_empty());

        Self::with_config(api_key, base_url, default_country)
    }

    /// Shared cache handle, for the periodic sweeper task.
    pub fn cache(&self) -> WeatherCache {
        self.cache.clone()
    }

    /// Location-format variants tried in order until one resolves.
    fn location_formats(&self, location: &str) -> Vec<String> {
        let mut formats = vec![location.to_string()];
        if let Some(cc) = &self.default_country {
            formats.push(format!("{}, {}", location, cc));
        }
        formats
    }

    /// Fetch the current observation for a free-text location.
    ///
    /// Serves from cache when fresh. A 404 ("city not found") moves on to
    /// the next format variant; any other upstream error aborts the retry
    /// loop, since it would fail identically for every variant.
    pub async fn fetch_by_location(&self, location: &str) -> Result<WeatherObservation> {
        if let Some(cached) = self.cache.get(location).await {
            return Ok(cached);
        }

        let mut last_message = None;
        for format in self.location_formats(location) {
            debug!(location = %format, "Querying weather API");
            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("q", format.as_str()),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ])
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let body: OwmResponse = response.json().await?;
                let observation: WeatherObservation = body.into();
                self.cache.set(location, observation.clone()).await;
                debug!(location = %location, resolved_as = %format, "Weather data cached");
                return Ok(observation);
            }

            let message = response
                .json::<OwmError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string());

            if status == StatusCode::NOT_FOUND {
                debug!(location = %format, "Location not found, trying next format");
                last_message = Some(message);
                continue;
            }

            // 401 (bad key), 429 (rate limit), 5xx: not retryable per-format.
            error!(location = %format, %status, message = %message, "Weather API error");
            return Err(Error::Weather(message));
        }

        warn!(location = %location, "Location not found after trying all formats");
        Err(Error::Weather(last_message.unwrap_or_else(|| {
            format!("Location not found: {}", location)
        })))
    }

    /// Fetch the current observation for a coordinate pair.
    pub async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherObservation> {
        let key = format!("{},{}", lat, lon);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", lat.to_string().as_str()),
                ("lon", lon.to_string().as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<OwmError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(Error::Weather(message));
        }

        let body: OwmResponse = response.json().await?;
        let observation: WeatherObservation = body.into();
        self.cache.set(&key, observation.clone()).await;
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_formats_without_country() {
        let client = WeatherClient::new("k".to_string()).unwrap();
        assert_eq!(client.location_formats("Manila"), vec!["Manila"]);
    }

    #[test]
    fn test_location_formats_with_country() {
        let client = WeatherClient::with_config(
            "k".to_string(),
            DEFAULT_WEATHER_API_URL.to_string(),
            Some("PH".to_string()),
        )
        .unwrap();
        assert_eq!(
            client.location_formats("Manila"),
            vec!["Manila", "Manila, PH"]
        );
    }
}
