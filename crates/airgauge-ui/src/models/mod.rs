pub mod air_model;
pub mod widget_state;

pub use air_model::AirQualityModel;
pub use widget_state::{AirQualityView, AqiPanel, Gauge, Phase, WidgetState};
