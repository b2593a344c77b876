//! Maps UI service errors to airgauge_core::AppError for consistent user-facing messages.

mod air;

pub use air::app_error_from_aqi;
