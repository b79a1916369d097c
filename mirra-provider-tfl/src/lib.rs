//! Transit arrivals provider backed by the TfL `StopPoint` API.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use mirra_core::{
    config::ArrivalsConfig,
    model::Arrival,
    ports::{ArrivalsPort, PortError},
};

const BASE_URL: &str = "https://api.tfl.gov.uk";

/// Single prediction from /StopPoint/{id}/Arrivals.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalEntry {
    #[serde(default)]
    line_name: String,

    // Absent for some rail modes.
    #[serde(default)]
    destination_name: String,

    #[serde(default)]
    towards: String,

    /// Seconds until the vehicle reaches the stop.
    time_to_station: i64,

    /// ISO-8601 timestamp, UTC.
    expected_arrival: String,

    #[serde(default)]
    platform_name: Option<String>,
}

/// Arrivals port implementation for Transport for London.
pub struct TflArrivalsPort {
    client: Client,
    naptan_id: String,
    stop_name: String,
    app_id: String,
    app_key: String,
}

impl TflArrivalsPort {
    /// Create a new port bound to the given HTTP client and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::MissingCredentials`] when the TfL app id or key
    /// is missing (file or environment).
    pub fn new(client: Client, config: &ArrivalsConfig) -> Result<Self, PortError> {
        let app_id = required_secret(config.app_id.as_deref(), "TfL app id")?;
        let app_key = required_secret(config.app_key.as_deref(), "TfL app key")?;

        let stop_name = config
            .stop_name
            .clone()
            .unwrap_or_else(|| config.naptan_id.clone());

        Ok(Self {
            client,
            naptan_id: config.naptan_id.clone(),
            stop_name,
            app_id,
            app_key,
        })
    }
}

#[async_trait]
impl ArrivalsPort for TflArrivalsPort {
    fn stop_name(&self) -> &str {
        &self.stop_name
    }

    async fn arrivals(&self, limit: usize) -> Result<Vec<Arrival>, PortError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let req = self
            .client
            .get(format!("{BASE_URL}/StopPoint/{}/Arrivals", self.naptan_id))
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
            ]);

        let mut entries = fetch_json::<Vec<ArrivalEntry>>(req).await?;

        // Upstream order is arbitrary; the display wants soonest first.
        entries.sort_by_key(|entry| entry.time_to_station);

        let mut arrivals = Vec::new();
        for entry in entries.into_iter().take(limit) {
            let expected = DateTime::parse_from_rfc3339(&entry.expected_arrival)
                .map_err(PortError::from)?
                .with_timezone(&Local)
                .naive_local();

            arrivals.push(Arrival {
                line: entry.line_name,
                destination: entry.destination_name,
                towards: entry.towards,
                seconds_to_arrival: entry.time_to_station,
                expected_arrival: expected,
                platform: entry.platform_name,
            });
        }

        Ok(arrivals)
    }
}

/// Build the arrivals port for the provider set.
///
/// # Errors
///
/// Returns [`PortError::MissingCredentials`] when credentials are missing.
pub fn port(client: Client, config: &ArrivalsConfig) -> Result<Arc<dyn ArrivalsPort>, PortError> {
    Ok(Arc::new(TflArrivalsPort::new(client, config)?))
}

fn required_secret(value: Option<&str>, what: &'static str) -> Result<String, PortError> {
    value
        .map(str::trim)
        .filter(|secret| !secret.is_empty())
        .map(str::to_owned)
        .ok_or(PortError::MissingCredentials(what))
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
