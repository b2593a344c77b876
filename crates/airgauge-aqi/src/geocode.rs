//! Reverse geocoding: convert coordinates to a human-readable address.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use crate::types::{AqiError, Coordinate};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const USER_AGENT: &str = concat!("airgauge/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
    /// Set instead of `display_name` when nothing is found (e.g. open ocean)
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Arc<Client>,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(base_url: &str) -> Result<Self, AqiError> {
        Self::with_options(
            base_url,
            USER_AGENT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, AqiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reverse geocode `coordinate` to its display name.
    ///
    /// Returns `Ok(None)` when the service answered without a display name.
    pub async fn reverse(&self, coordinate: &Coordinate) -> Result<Option<String>, AqiError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;

        let http_status = response.status();
        let body = response.text().await?;

        let parsed: NominatimResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !http_status.is_success() => {
                return Err(AqiError::Http(http_status.as_u16()));
            }
            Err(e) => return Err(AqiError::Parse(e.to_string())),
        };

        match parsed.display_name.filter(|name| !name.trim().is_empty()) {
            Some(name) => {
                tracing::info!("Reverse geocoded to: {}", name);
                Ok(Some(name))
            }
            None => {
                tracing::debug!(
                    "Reverse geocode had no display name ({})",
                    parsed.error.as_deref().unwrap_or("no error given")
                );
                Ok(None)
            }
        }
    }
}
