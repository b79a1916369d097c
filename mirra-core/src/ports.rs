//! Traits describing provider capabilities and shared helper types.

use async_trait::async_trait;
use chrono::ParseError as ChronoParseError;
use reqwest::Error as ReqwestError;

use crate::model::{AirQualityReading, Arrival, WeatherReport};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to upstream APIs.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Failed to parse a date from the upstream response.
    #[error("Parse error: {0}")]
    Parse(#[from] ChronoParseError),
    /// The provider has no credential to inject.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),
    /// The upstream accepted the request but reported a failure.
    #[error("Upstream error: {0}")]
    Upstream(String),
    /// No provider is configured for the requested widget.
    #[error("No provider configured for {0}")]
    Unconfigured(&'static str),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Weather backend for the configured location.
pub trait WeatherPort: Send + Sync {
    /// Fetch current conditions and the daily forecast.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the upstream request fails.
    async fn report(&self) -> Result<WeatherReport, PortError>;
}

#[async_trait]
/// Transit arrivals backend for the configured stop.
pub trait ArrivalsPort: Send + Sync {
    /// Human-friendly name of the stop being watched.
    fn stop_name(&self) -> &str;

    /// Fetch predicted arrivals, soonest first, at most `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the upstream request fails.
    async fn arrivals(&self, limit: usize) -> Result<Vec<Arrival>, PortError>;
}

#[async_trait]
/// Air-quality backend for the configured city.
pub trait AirQualityPort: Send + Sync {
    /// Fetch the current air-quality snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the upstream request fails or reports an
    /// error status.
    async fn reading(&self) -> Result<AirQualityReading, PortError>;
}
