//! Air quality backend: position lookup plus the AQI and address fetches.
//! All network work runs off the presentation thread; results sent via mpsc.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use airgauge_aqi::{
    AqiError, AqiProvider, Coordinate, LocationError, PositionSource, ReverseGeocoder,
};
use tokio_util::sync::CancellationToken;

/// Error type for air quality operations
#[derive(Debug, Clone, PartialEq)]
pub enum AirError {
    /// The position source refused or could not answer
    Location(LocationError),
    /// The provider answered with a non-ok status
    Rejected(String),
    /// Transport or parse failure
    Fetch(String),
}

impl std::fmt::Display for AirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AirError::Location(e) => write!(f, "Location error: {}", e),
            AirError::Rejected(s) => write!(f, "Provider rejected request: {}", s),
            AirError::Fetch(s) => write!(f, "Fetch error: {}", s),
        }
    }
}

impl std::error::Error for AirError {}

/// Messages sent from async operations back to the presentation thread
#[derive(Debug)]
pub enum AirServiceMessage {
    /// Result of the one-shot position request
    Located(Result<Coordinate, AirError>),
    /// Result of the AQI fetch
    AqiDone(Result<u32, AirError>),
    /// Result of the reverse geocode; `Ok(None)` when no display name came back
    AddressDone(Result<Option<String>, AirError>),
}

/// Everything the widget flow needs to talk to the outside world.
#[derive(Debug, Clone)]
pub struct AirServices {
    pub runtime: tokio::runtime::Handle,
    pub aqi: Arc<AqiProvider>,
    pub geocoder: Arc<ReverseGeocoder>,
    pub position: Arc<PositionSource>,
}

/// Request the current position once.
/// Sends `Located` on the channel when complete, unless cancelled first.
pub fn request_location(
    tx: &Sender<AirServiceMessage>,
    services: &AirServices,
    cancel: CancellationToken,
) {
    let tx = tx.clone();
    let position = services.position.clone();

    services.runtime.spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Position request cancelled");
            }
            result = position.current_position() => {
                if let Ok(coordinate) = &result {
                    tracing::info!("Got location: {}", coordinate);
                }
                let _ = tx.send(AirServiceMessage::Located(result.map_err(AirError::Location)));
            }
        }
    });
}

/// Start the AQI fetch and the reverse geocode for `coordinate`.
///
/// The two requests run as independent tasks; each sends its own message
/// and neither waits on the other.
pub fn request_fetch(
    tx: &Sender<AirServiceMessage>,
    services: &AirServices,
    coordinate: Coordinate,
    cancel: CancellationToken,
) {
    let aqi_tx = tx.clone();
    let aqi = services.aqi.clone();
    let aqi_cancel = cancel.clone();

    services.runtime.spawn(async move {
        tokio::select! {
            _ = aqi_cancel.cancelled() => {
                tracing::debug!("AQI fetch cancelled");
            }
            result = aqi.fetch(&coordinate) => {
                let result = result.map_err(|e| classify_failure(e));
                let _ = aqi_tx.send(AirServiceMessage::AqiDone(result));
            }
        }
    });

    let address_tx = tx.clone();
    let geocoder = services.geocoder.clone();

    services.runtime.spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Reverse geocode cancelled");
            }
            result = geocoder.reverse(&coordinate) => {
                let result = result.map_err(|e| classify_failure(e));
                let _ = address_tx.send(AirServiceMessage::AddressDone(result));
            }
        }
    });
}

/// Provider refusals stay distinct from transport and parse failures.
fn classify_failure(err: AqiError) -> AirError {
    match err {
        AqiError::Status(status) => AirError::Rejected(status),
        other => AirError::Fetch(other.to_string()),
    }
}
