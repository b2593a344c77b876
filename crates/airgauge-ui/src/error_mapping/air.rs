use airgauge_aqi::{AqiError, LocationError};
use airgauge_core::{AirQualityError, AppError, NetworkError, ReqwestErrorExt};

use crate::services::AirError;

impl From<AirError> for AppError {
    fn from(e: AirError) -> Self {
        match e {
            AirError::Location(LocationError::PermissionDenied) => {
                AppError::AirQuality(AirQualityError::LocationDenied)
            }
            AirError::Location(other) => {
                AppError::AirQuality(AirQualityError::LocationUnavailable(other.to_string()))
            }
            AirError::Rejected(s) => AppError::AirQuality(AirQualityError::ProviderError(s)),
            AirError::Fetch(s) => AppError::Network(NetworkError::InvalidResponse(s)),
        }
    }
}

/// Classify a provider error. Transport failures keep their reqwest detail.
pub fn app_error_from_aqi(e: AqiError) -> AppError {
    match e {
        AqiError::Network(err) => AppError::Network(err.into_network_error()),
        AqiError::Status(s) => AppError::AirQuality(AirQualityError::ProviderError(s)),
        AqiError::Http(status) if status >= 500 => {
            AppError::AirQuality(AirQualityError::ServiceUnavailable)
        }
        AqiError::Http(status) => AppError::Network(NetworkError::ServerError {
            status,
            message: format!("HTTP {}", status),
        }),
        AqiError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
    }
}
