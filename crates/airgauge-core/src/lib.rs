//! Core functionality for airgauge
//!
//! Configuration loading and validation, the application error hierarchy
//! and logging setup shared by the other crates.

pub mod config;
pub mod error;

pub use config::{
    AqiConfig, Config, DisplayConfig, GeocodeConfig, LocationConfig, LocationMode, LoggingConfig,
    ValidationResult,
};
pub use error::{AirQualityError, AppError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used. Output goes
/// to stderr so it never interleaves with the rendered gauge.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("airgauge core initialized");
    Ok(())
}
