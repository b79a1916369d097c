//! Air quality provider backed by the WAQI city feed.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use mirra_core::{
    config::AirQualityConfig,
    model::{AirQualityReading, AqiBand, Pollutant},
    ports::{AirQualityPort, PortError},
};

const BASE_URL: &str = "https://api.waqi.info";

/// Response wrapper from /feed/{city}/.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: String,

    #[serde(default)]
    data: Option<FeedData>,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    aqi: i64,
    city: CityEntry,

    #[serde(default)]
    iaqi: Iaqi,
}

#[derive(Debug, Deserialize)]
struct CityEntry {
    name: String,
}

/// Pollutant sub-indices; every field is optional per station.
#[derive(Debug, Default, Deserialize)]
struct Iaqi {
    #[serde(default)]
    pm25: Option<IaqiValue>,
    #[serde(default)]
    pm10: Option<IaqiValue>,
    #[serde(default)]
    o3: Option<IaqiValue>,
    #[serde(default)]
    no2: Option<IaqiValue>,
    #[serde(default)]
    so2: Option<IaqiValue>,
    #[serde(default)]
    co: Option<IaqiValue>,
}

#[derive(Debug, Deserialize)]
struct IaqiValue {
    #[serde(rename = "v")]
    value: f64,
}

/// Air-quality port implementation for the World Air Quality Index project.
pub struct WaqiPort {
    client: Client,
    city: String,
    api_token: String,
}

impl WaqiPort {
    /// Create a new port bound to the given HTTP client and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::MissingCredentials`] when no API token is
    /// configured (file or environment).
    pub fn new(client: Client, config: &AirQualityConfig) -> Result<Self, PortError> {
        let api_token = config
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(PortError::MissingCredentials("WAQI API token"))?
            .to_owned();

        Ok(Self {
            client,
            city: config.city.clone(),
            api_token,
        })
    }
}

#[async_trait]
impl AirQualityPort for WaqiPort {
    async fn reading(&self) -> Result<AirQualityReading, PortError> {
        let req = self
            .client
            .get(format!("{BASE_URL}/feed/{}/", self.city))
            .query(&[("token", self.api_token.as_str())]);

        let resp = fetch_json::<FeedResponse>(req).await?;

        if resp.status != "ok" {
            return Err(PortError::Upstream(format!(
                "WAQI reported status '{}'",
                resp.status
            )));
        }

        let data = resp
            .data
            .ok_or_else(|| PortError::Upstream("WAQI response carried no data".into()))?;

        Ok(AirQualityReading {
            station: data.city.name,
            index: data.aqi,
            band: AqiBand::from_index(data.aqi),
            pollutants: pollutants(&data.iaqi),
        })
    }
}

/// Build the air-quality port for the provider set.
///
/// # Errors
///
/// Returns [`PortError::MissingCredentials`] when no API token is configured.
pub fn port(
    client: Client,
    config: &AirQualityConfig,
) -> Result<Arc<dyn AirQualityPort>, PortError> {
    Ok(Arc::new(WaqiPort::new(client, config)?))
}

/// Flatten the sub-index block into display order.
fn pollutants(iaqi: &Iaqi) -> Vec<Pollutant> {
    let readings = [
        ("PM2.5", &iaqi.pm25),
        ("PM10", &iaqi.pm10),
        ("O3", &iaqi.o3),
        ("NO2", &iaqi.no2),
        ("SO2", &iaqi.so2),
        ("CO", &iaqi.co),
    ];

    readings
        .into_iter()
        .filter_map(|(label, value)| {
            value.as_ref().map(|reading| Pollutant {
                label: label.to_owned(),
                value: reading.value,
            })
        })
        .collect()
}

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
