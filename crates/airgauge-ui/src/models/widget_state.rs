//! Widget state and its transitions.
//!
//! Four mutable fields (coordinate, AQI, address, error) plus the lifecycle
//! phase. Each async completion writes only its own field; the error string
//! is shared and always overwritten by the most recent failure.

use airgauge_aqi::{AqiCategory, Coordinate, LocationError};

use crate::services::AirError;

pub const LOCATION_DENIED: &str = "Location access denied.";
pub const LOCATION_UNSUPPORTED: &str = "Geolocation is not supported on this host.";
pub const LOCATION_UNAVAILABLE: &str = "Unable to determine location.";
pub const AQI_FETCH_FAILED: &str = "Failed to fetch AQI data.";
pub const ADDRESS_FETCH_FAILED: &str = "Failed to fetch address.";
pub const FETCH_ERROR: &str = "Error fetching data.";

/// Gauge fill when there is no reading
pub const DEFAULT_GAUGE_COLOR: &str = "#ccc";

/// Lifecycle of one widget instance. Ready and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingLocation,
    AwaitingData,
    Ready,
    Failed,
}

/// What the gauge should draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gauge {
    pub value: u32,
    pub color: &'static str,
}

/// The AQI part of the widget: exactly one of these shows at a time
#[derive(Debug, Clone, PartialEq)]
pub enum AqiPanel {
    Error(String),
    Loading,
    Reading {
        aqi: u32,
        category: AqiCategory,
        gauge: Gauge,
    },
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityView {
    pub panel: AqiPanel,
    /// Shown whenever the reverse geocode produced a name
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WidgetState {
    phase: Phase,
    coordinate: Option<Coordinate>,
    aqi: Option<u32>,
    address: String,
    error: Option<String>,
    aqi_pending: bool,
    address_pending: bool,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            coordinate: None,
            aqi: None,
            address: String::new(),
            error: None,
            aqi_pending: false,
            address_pending: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn aqi(&self) -> Option<u32> {
        self.aqi
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of data fetches still outstanding (0..=2)
    pub fn pending_fetches(&self) -> u8 {
        u8::from(self.aqi_pending) + u8::from(self.address_pending)
    }

    /// Idle -> AwaitingLocation. Returns false if the position was already requested.
    pub fn begin_location_request(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::AwaitingLocation;
        true
    }

    /// Apply the position result.
    ///
    /// Returns the coordinate the data fetches should run for, or `None` when
    /// no fetch must start (failure, or a result arriving in the wrong phase).
    pub fn location_resolved(&mut self, result: Result<Coordinate, AirError>) -> Option<Coordinate> {
        if self.phase != Phase::AwaitingLocation {
            tracing::debug!("Ignoring position result in phase {:?}", self.phase);
            return None;
        }

        match result {
            Ok(coordinate) => {
                self.coordinate = Some(coordinate);
                self.phase = Phase::AwaitingData;
                self.aqi_pending = true;
                self.address_pending = true;
                Some(coordinate)
            }
            Err(e) => {
                let message = match e {
                    AirError::Location(LocationError::PermissionDenied) => LOCATION_DENIED,
                    AirError::Location(LocationError::ServiceUnavailable) => LOCATION_UNSUPPORTED,
                    _ => LOCATION_UNAVAILABLE,
                };
                self.set_error(message);
                self.phase = Phase::Failed;
                None
            }
        }
    }

    pub fn aqi_resolved(&mut self, result: Result<u32, AirError>) {
        if !self.aqi_pending || !self.accepts_data("AQI") {
            return;
        }
        self.aqi_pending = false;

        match result {
            Ok(aqi) => self.aqi = Some(aqi),
            Err(AirError::Rejected(_)) => self.set_error(AQI_FETCH_FAILED),
            Err(_) => self.set_error(FETCH_ERROR),
        }
    }

    pub fn address_resolved(&mut self, result: Result<Option<String>, AirError>) {
        if !self.address_pending || !self.accepts_data("address") {
            return;
        }
        self.address_pending = false;

        match result {
            Ok(Some(name)) => self.address = name,
            Ok(None) => self.set_error(ADDRESS_FETCH_FAILED),
            Err(_) => self.set_error(FETCH_ERROR),
        }
    }

    /// The first data result moves AwaitingData to Ready.
    fn accepts_data(&mut self, what: &str) -> bool {
        if !matches!(self.phase, Phase::AwaitingData | Phase::Ready) {
            tracing::debug!("Ignoring {} result in phase {:?}", what, self.phase);
            return false;
        }
        self.phase = Phase::Ready;
        true
    }

    /// Replace the visible error. Errors never accumulate.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Derived from the current reading on every call
    pub fn category(&self) -> Option<AqiCategory> {
        self.aqi.map(AqiCategory::classify)
    }

    pub fn gauge(&self) -> Gauge {
        Gauge {
            value: self.aqi.unwrap_or(0),
            color: self
                .category()
                .map_or(DEFAULT_GAUGE_COLOR, |category| category.color()),
        }
    }

    /// Nothing more will change: the flow failed, or every fetch has answered
    pub fn is_settled(&self) -> bool {
        match self.phase {
            Phase::Failed => true,
            Phase::Ready => self.pending_fetches() == 0,
            _ => false,
        }
    }

    pub fn view(&self) -> AirQualityView {
        let panel = match (&self.error, self.aqi, self.category()) {
            (Some(error), _, _) => AqiPanel::Error(error.clone()),
            (None, Some(aqi), Some(category)) => AqiPanel::Reading {
                aqi,
                category,
                gauge: self.gauge(),
            },
            _ => AqiPanel::Loading,
        };

        AirQualityView {
            panel,
            address: (!self.address.is_empty()).then(|| self.address.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located() -> WidgetState {
        let mut state = WidgetState::new();
        assert!(state.begin_location_request());
        let coordinate = Coordinate::new(37.0, -122.0).unwrap();
        assert_eq!(state.location_resolved(Ok(coordinate)), Some(coordinate));
        state
    }

    #[test]
    fn location_is_requested_once() {
        let mut state = WidgetState::new();
        assert!(state.begin_location_request());
        assert!(!state.begin_location_request());
        assert_eq!(state.phase(), Phase::AwaitingLocation);
    }

    #[test]
    fn denial_fails_without_fetches() {
        let mut state = WidgetState::new();
        state.begin_location_request();
        let next = state.location_resolved(Err(AirError::Location(LocationError::PermissionDenied)));

        assert!(next.is_none());
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.error(), Some(LOCATION_DENIED));
        assert_eq!(state.pending_fetches(), 0);
        assert!(state.is_settled());
    }

    #[test]
    fn unsupported_host_message() {
        let mut state = WidgetState::new();
        state.begin_location_request();
        state.location_resolved(Err(AirError::Location(LocationError::ServiceUnavailable)));
        assert_eq!(state.error(), Some(LOCATION_UNSUPPORTED));
    }

    #[test]
    fn coordinate_is_set_once() {
        let mut state = located();
        let other = Coordinate::new(1.0, 1.0).unwrap();
        assert!(state.location_resolved(Ok(other)).is_none());
        assert_eq!(state.coordinate().map(|c| c.latitude), Some(37.0));
    }

    #[test]
    fn first_fetch_makes_ready() {
        let mut state = located();
        assert_eq!(state.phase(), Phase::AwaitingData);
        assert!(!state.is_settled());

        state.address_resolved(Ok(Some("Example St".into())));
        assert_eq!(state.phase(), Phase::Ready);
        assert!(!state.is_settled());
        assert_eq!(state.view().panel, AqiPanel::Loading);

        state.aqi_resolved(Ok(42));
        assert!(state.is_settled());
    }

    #[test]
    fn aqi_rejection_keeps_reading_empty() {
        let mut state = located();
        state.aqi_resolved(Err(AirError::Rejected("error".into())));

        assert_eq!(state.aqi(), None);
        assert_eq!(state.error(), Some(AQI_FETCH_FAILED));
        assert_eq!(
            state.gauge(),
            Gauge {
                value: 0,
                color: DEFAULT_GAUGE_COLOR
            }
        );
        assert_eq!(state.view().panel, AqiPanel::Error(AQI_FETCH_FAILED.into()));
    }

    #[test]
    fn missing_address_does_not_touch_reading() {
        let mut state = located();
        state.aqi_resolved(Ok(42));
        state.address_resolved(Ok(None));

        assert_eq!(state.address(), "");
        assert_eq!(state.aqi(), Some(42));
        assert_eq!(state.error(), Some(ADDRESS_FETCH_FAILED));
        assert!(state.view().address.is_none());
    }

    #[test]
    fn later_error_overwrites_earlier() {
        let mut state = located();
        state.aqi_resolved(Err(AirError::Rejected("error".into())));
        state.address_resolved(Err(AirError::Fetch("connection reset".into())));
        assert_eq!(state.error(), Some(FETCH_ERROR));
    }

    #[test]
    fn fetch_failure_does_not_roll_back_other_result() {
        let mut state = located();
        state.address_resolved(Ok(Some("Example St".into())));
        state.aqi_resolved(Err(AirError::Fetch("timeout".into())));

        let view = state.view();
        assert_eq!(view.panel, AqiPanel::Error(FETCH_ERROR.into()));
        assert_eq!(view.address.as_deref(), Some("Example St"));
    }

    #[test]
    fn category_follows_reading() {
        let mut state = located();
        state.aqi_resolved(Ok(275));

        assert_eq!(state.category(), Some(AqiCategory::VeryUnhealthy));
        assert_eq!(state.gauge().color, "#8F3F97");
        match state.view().panel {
            AqiPanel::Reading { aqi, category, gauge } => {
                assert_eq!(aqi, 275);
                assert_eq!(category.status(), "Very Unhealthy");
                assert_eq!(gauge.value, 275);
            }
            other => panic!("expected reading, got {:?}", other),
        }
    }

    #[test]
    fn stray_results_are_ignored() {
        let mut state = WidgetState::new();
        state.aqi_resolved(Ok(10));
        state.address_resolved(Ok(Some("Nowhere".into())));
        assert_eq!(state.aqi(), None);
        assert_eq!(state.address(), "");
        assert_eq!(state.phase(), Phase::Idle);

        let mut state = located();
        state.aqi_resolved(Ok(10));
        state.aqi_resolved(Ok(99));
        assert_eq!(state.aqi(), Some(10));
        assert_eq!(state.pending_fetches(), 1);

        state.address_resolved(Ok(Some("Example St".into())));
        state.address_resolved(Ok(Some("Elsewhere".into())));
        assert_eq!(state.address(), "Example St");
        assert!(state.is_settled());
    }
}
