//! Host position sources.
//!
//! A widget asks its [`PositionSource`] for the current coordinate once.
//! Sources either answer with a coordinate or report that location access
//! was denied or is not available on this host.

use crate::types::{Coordinate, LocationError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const IP_LOOKUP_URL: &str = "http://ip-api.com/json/";
const LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// Locates the host through an IP geolocation endpoint
/// answering `{"status": "success", "lat": .., "lon": ..}`.
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new(url: &str) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
            .map_err(|e| LocationError::Other(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    async fn locate(&self) -> Result<Coordinate, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!("IP lookup returned status {}", response.status());
            return Err(LocationError::ServiceUnavailable);
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Coordinate::new(lat, lon),
            _ => {
                tracing::debug!(
                    "IP lookup could not locate host: {}",
                    body.message.as_deref().unwrap_or(&body.status)
                );
                Err(LocationError::ServiceUnavailable)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum PositionSource {
    /// A known coordinate (configuration or command line)
    Fixed(Coordinate),
    /// Ask an IP geolocation service
    IpLookup(IpLocator),
    /// The user has turned location access off
    Disabled,
}

impl PositionSource {
    /// Resolve the current position. Never retries.
    pub async fn current_position(&self) -> Result<Coordinate, LocationError> {
        match self {
            Self::Fixed(coordinate) => Ok(*coordinate),
            Self::IpLookup(locator) => locator.locate().await,
            Self::Disabled => Err(LocationError::PermissionDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_source_returns_coordinate() {
        let coordinate = Coordinate::new(37.0, -122.0).unwrap();
        let source = PositionSource::Fixed(coordinate);
        assert_eq!(source.current_position().await, Ok(coordinate));
    }

    #[tokio::test]
    async fn test_disabled_source_is_denied() {
        let source = PositionSource::Disabled;
        assert_eq!(
            source.current_position().await,
            Err(LocationError::PermissionDenied)
        );
    }
}
