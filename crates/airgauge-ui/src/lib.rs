pub mod app_services;
pub mod error_mapping;
pub mod models;
pub mod render;
pub mod services;

pub use app_services::AppServices;
pub use models::{AirQualityModel, AirQualityView, AqiPanel, Phase};
pub use render::{render, RenderOptions};
