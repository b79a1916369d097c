//! Weather provider backed by the OpenWeatherMap One Call 3.0 API.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use mirra_core::{
    config::WeatherConfig,
    model::{CurrentWeather, DailyForecast, WeatherKind, WeatherReport},
    ports::{PortError, WeatherPort},
};

const BASE_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Response subset from the One Call endpoint.
#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: CurrentEntry,

    #[serde(default)]
    daily: Vec<DailyEntry>,
}

/// Current conditions block.
#[derive(Debug, Deserialize)]
struct CurrentEntry {
    temp: f64,
    feels_like: f64,
    humidity: u8,

    // Unix timestamps, UTC.
    sunrise: i64,
    sunset: i64,

    weather: Vec<ConditionEntry>,
}

/// One day of the daily forecast.
#[derive(Debug, Deserialize)]
struct DailyEntry {
    dt: i64,
    temp: DailyTemp,
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyTemp {
    min: f64,
    max: f64,
}

/// Condition id + text as OpenWeather reports them.
#[derive(Debug, Deserialize)]
struct ConditionEntry {
    id: u16,

    #[serde(default)]
    description: String,
}

/// Weather port implementation for OpenWeatherMap.
pub struct OpenWeatherPort {
    client: Client,
    latitude: f64,
    longitude: f64,
    api_key: String,
}

impl OpenWeatherPort {
    /// Create a new port bound to the given HTTP client and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::MissingCredentials`] when no API key is
    /// configured (file or environment).
    pub fn new(client: Client, config: &WeatherConfig) -> Result<Self, PortError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(PortError::MissingCredentials("OpenWeatherMap API key"))?
            .to_owned();

        Ok(Self {
            client,
            latitude: config.latitude,
            longitude: config.longitude,
            api_key,
        })
    }
}

#[async_trait]
impl WeatherPort for OpenWeatherPort {
    async fn report(&self) -> Result<WeatherReport, PortError> {
        let req = self.client.get(BASE_URL).query(&[
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("units", "metric".to_owned()),
            // Minutely and hourly blocks are large and unused.
            ("exclude", "minutely,hourly,alerts".to_owned()),
            ("appid", self.api_key.clone()),
        ]);

        let resp = fetch_json::<OneCallResponse>(req).await?;

        let condition = resp
            .current
            .weather
            .first()
            .ok_or_else(|| PortError::Internal("Empty condition list".into()))?;
        let kind = WeatherKind::from_id(condition.id)
            .ok_or_else(|| PortError::Internal(format!("Unknown condition id {}", condition.id)))?;

        let current = CurrentWeather {
            temperature: resp.current.temp,
            feels_like: resp.current.feels_like,
            humidity: resp.current.humidity,
            kind,
            description: condition.description.clone(),
            sunrise: local_datetime(resp.current.sunrise)?,
            sunset: local_datetime(resp.current.sunset)?,
        };

        let mut daily = Vec::new();
        for entry in resp.daily {
            // Days with an unrecognized condition are dropped rather than
            // failing the whole report.
            let Some(kind) = entry
                .weather
                .first()
                .and_then(|condition| WeatherKind::from_id(condition.id))
            else {
                continue;
            };

            daily.push(DailyForecast {
                date: local_datetime(entry.dt)?.date(),
                temp_min: entry.temp.min,
                temp_max: entry.temp.max,
                kind,
            });
        }

        Ok(WeatherReport { current, daily })
    }
}

/// Build the weather port for the provider set.
///
/// # Errors
///
/// Returns [`PortError::MissingCredentials`] when no API key is configured.
pub fn port(client: Client, config: &WeatherConfig) -> Result<Arc<dyn WeatherPort>, PortError> {
    Ok(Arc::new(OpenWeatherPort::new(client, config)?))
}

/// Project a unix timestamp into local wall-clock time.
fn local_datetime(timestamp: i64) -> Result<NaiveDateTime, PortError> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(&Local).naive_local())
        .ok_or_else(|| PortError::Internal(format!("Timestamp {timestamp} out of range")))
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
