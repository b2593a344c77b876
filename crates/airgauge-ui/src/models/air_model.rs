use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use airgauge_core::AppError;
use tokio_util::sync::CancellationToken;

use crate::models::widget_state::{AirQualityView, WidgetState};
use crate::services::{self, AirError, AirServiceMessage, AirServices};

/// The live air quality widget.
///
/// Owns the widget state and the channel the async service layer reports
/// into. Dropping the model cancels any request still in flight; results
/// that arrive after that are discarded.
pub struct AirQualityModel {
    state: WidgetState,
    services: AirServices,
    tx: Sender<AirServiceMessage>,
    rx: Receiver<AirServiceMessage>,
    cancel: CancellationToken,
}

impl AirQualityModel {
    pub fn new(services: AirServices, cancel: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: WidgetState::new(),
            services,
            tx,
            rx,
            cancel,
        }
    }

    /// Start the flow: request the current position exactly once.
    /// Calling this again is a no-op.
    pub fn mount(&mut self) {
        if !self.state.begin_location_request() {
            tracing::debug!("AirQualityModel already mounted");
            return;
        }
        tracing::info!("Requesting current position");
        services::request_air_location(&self.tx, &self.services, self.cancel.clone());
    }

    /// Stop all outstanding work. The state stays as it is.
    pub fn unmount(&mut self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("AirQualityModel unmounted");
            self.cancel.cancel();
        }
    }

    /// Apply every message already waiting. Returns true if any arrived.
    pub fn poll_channel(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            changed = true;
        }
        changed
    }

    /// Block up to `timeout` for the next message, then drain the rest.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => {
                self.apply(msg);
                self.poll_channel();
                true
            }
            Err(_) => false,
        }
    }

    pub fn apply(&mut self, msg: AirServiceMessage) {
        if self.cancel.is_cancelled() {
            tracing::debug!("Discarding {:?} after unmount", msg);
            return;
        }

        match msg {
            AirServiceMessage::Located(result) => {
                log_failure(&result);
                if let Some(coordinate) = self.state.location_resolved(result) {
                    services::request_air_fetch(
                        &self.tx,
                        &self.services,
                        coordinate,
                        self.cancel.clone(),
                    );
                }
            }
            AirServiceMessage::AqiDone(result) => {
                log_failure(&result);
                self.state.aqi_resolved(result);
            }
            AirServiceMessage::AddressDone(result) => {
                log_failure(&result);
                self.state.address_resolved(result);
            }
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn view(&self) -> AirQualityView {
        self.state.view()
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_settled()
    }
}

impl Drop for AirQualityModel {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn log_failure<T>(result: &Result<T, AirError>) {
    if let Err(e) = result {
        let app_err = AppError::from(e.clone());
        tracing::warn!("{} ({})", app_err, app_err.user_message());
    }
}
