//! High-level service facade combining the schedule resolver and providers.

use chrono::NaiveDateTime;

use crate::config::MirraConfig;
use crate::model::{AirQualityReading, Arrival, ResolvedCollection, WeatherReport};
use crate::ports::PortError;
use crate::provider::ProviderSet;
use crate::schedule::resolve_next_collections;

/// Public entry point the display renders from.
pub struct MirraService {
    providers: ProviderSet,
    config: MirraConfig,
}

impl MirraService {
    /// Create a new service from a validated configuration and provider set.
    #[must_use]
    pub fn new(config: MirraConfig, providers: ProviderSet) -> Self {
        Self { providers, config }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &MirraConfig {
        &self.config
    }

    /// Resolve the next bin collections for the given local wall-clock time.
    ///
    /// Pure and synchronous; safe to call on every tick.
    #[must_use]
    pub fn next_collections(&self, now: NaiveDateTime) -> Vec<ResolvedCollection> {
        resolve_next_collections(
            now,
            &self.config.bins.collections,
            &self.config.bins.holiday_exceptions,
            self.config.bins.cutoff_hour,
        )
    }

    /// Whether a weather provider is wired up.
    #[must_use]
    pub fn has_weather(&self) -> bool {
        self.providers.weather.is_some()
    }

    /// Whether an arrivals provider is wired up.
    #[must_use]
    pub fn has_arrivals(&self) -> bool {
        self.providers.arrivals.is_some()
    }

    /// Whether an air-quality provider is wired up.
    #[must_use]
    pub fn has_air_quality(&self) -> bool {
        self.providers.air_quality.is_some()
    }

    /// Fetch the current weather report.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unconfigured`] when no weather provider is wired
    /// up, or the provider's own error when the fetch fails.
    pub async fn weather(&self) -> Result<WeatherReport, PortError> {
        let port = self
            .providers
            .weather
            .as_ref()
            .ok_or(PortError::Unconfigured("weather"))?;
        port.report().await
    }

    /// Fetch upcoming arrivals for the configured stop.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unconfigured`] when no arrivals provider is wired
    /// up, or the provider's own error when the fetch fails.
    pub async fn arrivals(&self) -> Result<Vec<Arrival>, PortError> {
        let port = self
            .providers
            .arrivals
            .as_ref()
            .ok_or(PortError::Unconfigured("arrivals"))?;
        let limit = self
            .config
            .arrivals
            .as_ref()
            .map_or(5, |arrivals| arrivals.limit);
        port.arrivals(limit).await
    }

    /// Name of the watched transit stop, if arrivals are configured.
    #[must_use]
    pub fn stop_name(&self) -> Option<&str> {
        self.providers
            .arrivals
            .as_ref()
            .map(|port| port.stop_name())
    }

    /// Fetch the current air-quality reading.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unconfigured`] when no air-quality provider is
    /// wired up, or the provider's own error when the fetch fails.
    pub async fn air_quality(&self) -> Result<AirQualityReading, PortError> {
        let port = self
            .providers
            .air_quality
            .as_ref()
            .ok_or(PortError::Unconfigured("air quality"))?;
        port.reading().await
    }
}
