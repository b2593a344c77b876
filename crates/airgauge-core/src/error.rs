//! Centralized error types for airgauge.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Air quality error: {0}")]
    AirQuality(#[from] AirQualityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::AirQuality(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration file error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "No configuration directory. Pass --config.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Io(_) => "The configuration file could not be read or written.",
        }
    }
}

/// Air quality service errors.
#[derive(Debug, Error)]
pub enum AirQualityError {
    #[error("Location access denied")]
    LocationDenied,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("AQI provider error: {0}")]
    ProviderError(String),

    #[error("Missing API token")]
    MissingApiToken,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl AirQualityError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AirQualityError::LocationDenied => "Location access denied.",
            AirQualityError::LocationUnavailable(_) => {
                "Your location could not be determined."
            }
            AirQualityError::ProviderError(_) => "Air quality service error. Please try again.",
            AirQualityError::MissingApiToken => {
                "No AQI API token configured. Set AIRGAUGE_API_TOKEN."
            }
            AirQualityError::ServiceUnavailable => {
                "Air quality service unavailable. Please try again later."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::AirQuality(AirQualityError::LocationDenied),
            AppError::AirQuality(AirQualityError::MissingApiToken),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let air_err = AirQualityError::LocationDenied;
        let app_err: AppError = air_err.into();
        assert!(matches!(
            app_err,
            AppError::AirQuality(AirQualityError::LocationDenied)
        ));
    }

    #[test]
    fn test_config_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let app_err: AppError = ConfigError::from(io).into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Io(_))));
        assert_eq!(
            app_err.user_message(),
            "The configuration file could not be read or written."
        );
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::AirQuality(AirQualityError::LocationDenied);
        assert_eq!(app_err.user_message(), "Location access denied.");
    }

    #[test]
    fn test_server_error_messages_by_status() {
        let upstream = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        let client = NetworkError::ServerError {
            status: 404,
            message: "missing".into(),
        };
        assert!(upstream.user_message().contains("later"));
        assert_eq!(client.user_message(), "The request failed. Please try again.");
    }
}
