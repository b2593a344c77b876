//! Air quality data for airgauge
//!
//! Provides AQI readings via the WAQI feed API, reverse geocoding via
//! Nominatim, host position sources and the AQI health categories.

pub mod types;
pub mod geocode;
pub mod location;
pub mod provider;

pub use types::*;
pub use geocode::ReverseGeocoder;
pub use location::{IpLocator, PositionSource};
pub use provider::AqiProvider;
