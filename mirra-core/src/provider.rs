//! Bundle of provider implementations wired up by the binary.

use std::sync::Arc;

use crate::ports::{AirQualityPort, ArrivalsPort, WeatherPort};

/// Provider implementations for each network-backed widget.
///
/// Every slot is optional; a widget whose provider is absent simply does not
/// render. The bin schedule needs no slot here because it is computed locally
/// from configuration.
#[derive(Default)]
pub struct ProviderSet {
    /// Weather backend.
    pub weather: Option<Arc<dyn WeatherPort>>,
    /// Transit arrivals backend.
    pub arrivals: Option<Arc<dyn ArrivalsPort>>,
    /// Air-quality backend.
    pub air_quality: Option<Arc<dyn AirQualityPort>>,
}
