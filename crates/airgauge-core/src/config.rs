use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the WAQI API token
pub const API_TOKEN_ENV: &str = "AIRGAUGE_API_TOKEN";

static ENV_API_TOKEN: OnceLock<Option<String>> = OnceLock::new();

/// API token from the environment, read once per process.
pub fn env_api_token() -> Option<&'static str> {
    ENV_API_TOKEN
        .get_or_init(|| {
            std::env::var(API_TOKEN_ENV)
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        })
        .as_deref()
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// WAQI feed settings
    #[serde(default)]
    pub aqi: AqiConfig,

    /// Nominatim reverse geocoding settings
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Where the current position comes from
    #[serde(default)]
    pub location: LocationConfig,

    /// Terminal rendering
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AqiConfig {
    pub base_url: String,

    /// API token. Falls back to the AIRGAUGE_API_TOKEN environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub timeout_secs: u64,
}

impl Default for AqiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.waqi.info".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("airgauge/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// Position source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// Locate the host by IP address
    #[default]
    Auto,
    /// Use `latitude`/`longitude` from this section
    Fixed,
    /// Location access denied
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub mode: LocationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub ip_lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            mode: LocationMode::Auto,
            latitude: None,
            longitude: None,
            ip_lookup_url: "http://ip-api.com/json/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Emit ANSI colors
    pub color: bool,
    /// Outer radius of the gauge ring, in terminal rows
    pub gauge_radius: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            gauge_radius: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset (error, warn, info, debug, trace)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Validate the configuration, consuming it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn into_validated(self) -> Result<(Self, ValidationResult), ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// The API token to use: config file first, then the environment
    pub fn api_token(&self) -> Option<String> {
        self.aqi
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| env_api_token().map(str::to_string))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.aqi.base_url, "aqi.base_url", &mut result);
        self.validate_url(&self.geocode.base_url, "geocode.base_url", &mut result);

        self.validate_timeout(self.aqi.timeout_secs, "aqi.timeout_secs", &mut result);
        self.validate_timeout(self.geocode.timeout_secs, "geocode.timeout_secs", &mut result);

        if self.api_token().is_none() {
            result.add_warning(
                "aqi.token",
                format!("No API token configured (set {} or aqi.token)", API_TOKEN_ENV),
            );
        }

        if self.geocode.user_agent.trim().is_empty() {
            result.add_error("geocode.user_agent", "User agent must not be empty");
        }

        self.validate_location(&mut result);

        if self.display.gauge_radius == 0 {
            result.add_error("display.gauge_radius", "Gauge radius must be greater than 0");
        } else if self.display.gauge_radius > 40 {
            result.add_warning(
                "display.gauge_radius",
                "Gauge radius is unusually large (>40 rows)",
            );
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            result.add_error(
                "logging.level",
                format!("Unknown log level: {}", self.logging.level),
            );
        }

        result
    }

    fn validate_location(&self, result: &mut ValidationResult) {
        let loc = &self.location;

        if let Some(lat) = loc.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                result.add_error("location.latitude", "Latitude must be within -90..=90");
            }
        }
        if let Some(lon) = loc.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                result.add_error("location.longitude", "Longitude must be within -180..=180");
            }
        }

        match loc.mode {
            LocationMode::Fixed => {
                if loc.latitude.is_none() || loc.longitude.is_none() {
                    result.add_error(
                        "location",
                        "Fixed mode requires both latitude and longitude",
                    );
                }
            }
            LocationMode::Auto => {
                self.validate_url(&loc.ip_lookup_url, "location.ip_lookup_url", result);
                if loc.latitude.is_some() || loc.longitude.is_some() {
                    result.add_warning(
                        "location",
                        "Coordinates are ignored unless mode = \"fixed\"",
                    );
                }
            }
            LocationMode::Disabled => {}
        }
    }

    fn validate_timeout(&self, secs: u64, field_name: &str, result: &mut ValidationResult) {
        if secs == 0 {
            result.add_error(field_name, "Timeout must be greater than 0");
        } else if secs > 300 {
            result.add_warning(field_name, "Timeout is more than 5 minutes");
        }
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no configuration directory".to_string()))?
            .join("airgauge");

        Ok(config_dir.join("config.toml"))
    }
}
