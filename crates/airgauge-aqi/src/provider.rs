//! Air quality readings from the World Air Quality Index (WAQI) feed API.
//! See: https://aqicn.org/json-api/doc/

use crate::types::{AqiError, Coordinate};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const WAQI_URL: &str = "https://api.waqi.info";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct WaqiResponse {
    status: String,
    /// An object on success, an error string otherwise
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct AqiProvider {
    client: Arc<Client>,
    base_url: String,
    token: String,
}

impl AqiProvider {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, AqiError> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AqiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Feed URL for a coordinate, without the token
    pub fn feed_url(&self, coordinate: &Coordinate) -> String {
        format!(
            "{}/feed/geo:{};{}/",
            self.base_url, coordinate.latitude, coordinate.longitude
        )
    }

    /// Fetch the current AQI at `coordinate`.
    ///
    /// A response whose `status` is anything but `"ok"` is reported as
    /// [`AqiError::Status`] so callers can tell a provider refusal from a
    /// transport failure.
    pub async fn fetch(&self, coordinate: &Coordinate) -> Result<u32, AqiError> {
        let url = self.feed_url(coordinate);
        tracing::debug!("Fetching AQI from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await?;

        let http_status = response.status();
        let body = response.text().await?;

        // WAQI reports refusals in the body, sometimes with a 4xx status
        let parsed: WaqiResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !http_status.is_success() => {
                return Err(AqiError::Http(http_status.as_u16()));
            }
            Err(e) => return Err(AqiError::Parse(e.to_string())),
        };

        if parsed.status != "ok" {
            tracing::debug!(
                "AQI feed reported status {:?} (HTTP {}): {}",
                parsed.status,
                http_status,
                parsed.data
            );
            return Err(AqiError::Status(parsed.status));
        }

        let aqi = parse_aqi(&parsed.data)?;
        tracing::info!("AQI at {} is {}", coordinate, aqi);
        Ok(aqi)
    }
}

/// Extract `data.aqi`. Stations without a current reading report `"-"`.
fn parse_aqi(data: &serde_json::Value) -> Result<u32, AqiError> {
    let value = data
        .get("aqi")
        .ok_or_else(|| AqiError::Parse("missing data.aqi".to_string()))?;

    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| AqiError::Parse(format!("aqi out of range: {}", n))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| AqiError::Parse(format!("aqi is not numeric: {:?}", s))),
        other => Err(AqiError::Parse(format!("unexpected aqi value: {}", other))),
    }
}
