//! Centralized application services.
//!
//! `AppServices` owns the tokio runtime and the shared network clients the
//! air quality widget talks through. Clients live behind RwLock so they can
//! be rebuilt from a fresh config or cleared on shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use airgauge_aqi::{AqiProvider, Coordinate, IpLocator, PositionSource, ReverseGeocoder};
use airgauge_core::{AirQualityError, AppError, Config, LocationConfig, LocationMode};

use crate::error_mapping::app_error_from_aqi;
use crate::services::AirServices;

pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    /// Parent of every widget cancellation token
    shutdown: CancellationToken,

    /// WAQI feed client
    aqi_provider: RwLock<Option<Arc<AqiProvider>>>,

    /// Nominatim client
    geocoder: RwLock<Option<Arc<ReverseGeocoder>>>,

    /// Where the current position comes from
    position_source: RwLock<Option<Arc<PositionSource>>>,
}

/// Global singleton for application services
static SERVICES: OnceLock<Arc<AppServices>> = OnceLock::new();

impl AppServices {
    /// Build a standalone instance with its own runtime.
    pub fn new() -> Result<Self, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("airgauge-tokio")
            .build()?;

        Ok(Self {
            runtime,
            shutdown: CancellationToken::new(),
            aqi_provider: RwLock::new(None),
            geocoder: RwLock::new(None),
            position_source: RwLock::new(None),
        })
    }

    /// Initialize the process-wide services.
    ///
    /// Subsequent calls return the existing instance.
    pub fn init() -> Result<Arc<Self>, AppError> {
        if let Some(existing) = SERVICES.get() {
            return Ok(existing.clone());
        }

        let services = Arc::new(Self::new()?);
        tracing::info!("AppServices initialized");
        Ok(SERVICES.get_or_init(|| services).clone())
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Token for one widget instance. Cancelled by [`AppServices::shutdown`].
    pub fn child_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Cancel outstanding work and clear all clients.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");

        self.shutdown.cancel();

        *self.aqi_provider.write() = None;
        *self.geocoder.write() = None;
        *self.position_source.write() = None;

        tracing::info!("AppServices shutdown complete");
    }

    // =========== Air Quality Services ===========

    pub fn aqi_provider(&self) -> Option<Arc<AqiProvider>> {
        self.aqi_provider.read().clone()
    }

    pub fn geocoder(&self) -> Option<Arc<ReverseGeocoder>> {
        self.geocoder.read().clone()
    }

    pub fn position_source(&self) -> Option<Arc<PositionSource>> {
        self.position_source.read().clone()
    }

    /// Build the AQI, geocoding and position clients from `config`.
    pub fn init_air_services(&self, config: &Config) -> Result<(), AppError> {
        let token = match config.api_token() {
            Some(token) => token,
            None => {
                let err = AppError::from(AirQualityError::MissingApiToken);
                tracing::warn!("{} ({})", err, err.user_message());
                String::new()
            }
        };

        let provider = AqiProvider::with_timeout(
            &config.aqi.base_url,
            token,
            Duration::from_secs(config.aqi.timeout_secs),
        )
        .map_err(app_error_from_aqi)?;

        let geocoder = ReverseGeocoder::with_options(
            &config.geocode.base_url,
            &config.geocode.user_agent,
            Duration::from_secs(config.geocode.timeout_secs),
        )
        .map_err(app_error_from_aqi)?;

        let position = position_source_from_config(&config.location)?;

        *self.aqi_provider.write() = Some(Arc::new(provider));
        *self.geocoder.write() = Some(Arc::new(geocoder));
        *self.position_source.write() = Some(Arc::new(position));

        tracing::info!("Air quality services initialized");
        Ok(())
    }

    /// Bundle the clients for one widget. `None` until
    /// [`AppServices::init_air_services`] succeeds or after shutdown.
    pub fn air_services(&self) -> Option<AirServices> {
        Some(AirServices {
            runtime: self.runtime(),
            aqi: self.aqi_provider()?,
            geocoder: self.geocoder()?,
            position: self.position_source()?,
        })
    }
}

/// Pick the position source the location settings describe.
pub fn position_source_from_config(location: &LocationConfig) -> Result<PositionSource, AppError> {
    match location.mode {
        LocationMode::Disabled => Ok(PositionSource::Disabled),
        LocationMode::Fixed => match (location.latitude, location.longitude) {
            (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude)
                .map(PositionSource::Fixed)
                .map_err(|e| AirQualityError::LocationUnavailable(e.to_string()).into()),
            _ => Err(AirQualityError::LocationUnavailable(
                "fixed location needs latitude and longitude".into(),
            )
            .into()),
        },
        LocationMode::Auto => IpLocator::new(&location.ip_lookup_url)
            .map(PositionSource::IpLookup)
            .map_err(|e| AirQualityError::LocationUnavailable(e.to_string()).into()),
    }
}
