//! Weather backend: async weather fetching for a view.
//! Network work runs on the tokio runtime; results come back over mpsc tagged
//! with the request id they were issued under.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use skyview_core::WeatherError;
use skyview_weather::{SelectedLocation, WeatherProvider, WeatherReport};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::request::{RequestId, RequestTracker};

/// A fetch to dispatch with `request_fetch`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRequest {
    pub request_id: RequestId,
    pub location: SelectedLocation,
}

/// Messages sent from async operations back to the owning view
#[derive(Debug)]
pub enum WeatherServiceMessage {
    FetchDone {
        request_id: RequestId,
        location: SelectedLocation,
        result: Result<WeatherReport, WeatherError>,
    },
}

/// Fetch current conditions and forecast for `request` on `runtime`.
/// Sends `FetchDone` on the channel when complete.
pub fn request_fetch(
    tx: &Sender<WeatherServiceMessage>,
    runtime: &Handle,
    provider: Arc<WeatherProvider>,
    request: WeatherRequest,
) -> JoinHandle<()> {
    let tx = tx.clone();

    runtime.spawn(async move {
        let WeatherRequest {
            request_id,
            location,
        } = request;
        tracing::info!(
            "Fetching weather {} for {} ({}, {})",
            request_id,
            location.label,
            location.latitude,
            location.longitude
        );

        let (current, forecast) = tokio::join!(
            provider.fetch_current(location.latitude, location.longitude),
            provider.fetch_forecast(location.latitude, location.longitude),
        );

        let result = match (current, forecast) {
            (Some(current), Some(forecast)) => Ok(WeatherReport { current, forecast }),
            _ => Err(WeatherError::Unavailable),
        };

        let message = WeatherServiceMessage::FetchDone {
            request_id,
            location,
            result,
        };
        if tx.send(message).is_err() {
            tracing::debug!("Weather view gone before request {} finished", request_id);
        }
    })
}

/// What a weather view is showing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Ready(WeatherReport),
    Unavailable(String),
}

/// State of one weather display: the current selection and its data.
#[derive(Debug, Default)]
pub struct WeatherView {
    tracker: RequestTracker,
    selection: Option<SelectedLocation>,
    state: ViewState,
}

impl WeatherView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection and start a new request for it.
    ///
    /// Any request still in flight for the previous selection becomes stale.
    pub fn select(&mut self, location: SelectedLocation) -> WeatherRequest {
        let request_id = self.tracker.issue();
        self.selection = Some(location.clone());
        self.state = ViewState::Loading;
        WeatherRequest {
            request_id,
            location,
        }
    }

    /// Apply a finished fetch. Returns false if it was stale and dropped.
    pub fn apply(&mut self, message: WeatherServiceMessage) -> bool {
        match message {
            WeatherServiceMessage::FetchDone {
                request_id,
                location,
                result,
            } => {
                if !self.tracker.is_latest(request_id) {
                    tracing::debug!(
                        "Discarding stale weather result {} for {}",
                        request_id,
                        location.label
                    );
                    return false;
                }

                self.state = match result {
                    Ok(report) => ViewState::Ready(report),
                    Err(e) => {
                        tracing::warn!("Weather for {} unavailable: {}", location.label, e);
                        ViewState::Unavailable(e.user_message().to_string())
                    }
                };
                true
            }
        }
    }

    /// Apply every message already waiting on `rx` without blocking.
    /// Returns the number of messages that were applied (not stale).
    pub fn drain(&mut self, rx: &Receiver<WeatherServiceMessage>) -> usize {
        let mut applied = 0;
        while let Ok(message) = rx.try_recv() {
            if self.apply(message) {
                applied += 1;
            }
        }
        applied
    }

    pub fn selection(&self) -> Option<&SelectedLocation> {
        self.selection.as_ref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match &self.state {
            ViewState::Ready(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }
}
