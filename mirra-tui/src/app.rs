use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Local};
use mirra_core::{
    model::{AirQualityReading, Arrival, ResolvedCollection, WeatherReport},
    service::MirraService,
};

pub(crate) struct App {
    pub service: Arc<MirraService>,

    pub now: DateTime<Local>,
    pub next_collections: Vec<ResolvedCollection>,

    pub weather: Option<WeatherReport>,
    pub weather_error: Option<String>,

    pub arrivals: Vec<Arrival>,
    pub arrivals_error: Option<String>,

    pub air_quality: Option<AirQualityReading>,
    pub air_quality_error: Option<String>,

    pub is_loading: bool,
    last_refresh: Option<Instant>,
}

impl App {
    pub(crate) fn new(service: Arc<MirraService>) -> Self {
        let now = Local::now();
        let next_collections = service.next_collections(now.naive_local());
        Self {
            service,
            now,
            next_collections,
            weather: None,
            weather_error: None,
            arrivals: Vec::new(),
            arrivals_error: None,
            air_quality: None,
            air_quality_error: None,
            is_loading: false,
            last_refresh: None,
        }
    }

    /// Advance the wall clock and recompute the bin schedule from it.
    pub(crate) fn tick(&mut self) {
        self.now = Local::now();
        self.next_collections = self.service.next_collections(self.now.naive_local());
    }

    pub(crate) fn refresh_due(&self) -> bool {
        let interval = StdDuration::from_secs(self.service.config().refresh_interval_seconds);
        self.last_refresh
            .is_none_or(|last| last.elapsed() >= interval)
    }

    pub(crate) fn mark_refreshed(&mut self) {
        self.last_refresh = Some(Instant::now());
    }

    pub(crate) fn force_refresh(&mut self) {
        self.last_refresh = None;
    }

    /// Widget errors collected for the status bar.
    pub(crate) fn errors(&self) -> Vec<&str> {
        [
            self.weather_error.as_deref(),
            self.arrivals_error.as_deref(),
            self.air_quality_error.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
