//! Tagged retrieval outcome consumed by the presentation layer.

use skycast_weather::{ForecastSnapshot, WeatherError};

/// Which user-facing message an error maps to. The UI renders connectivity
/// loss differently from service-side trouble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Offline,
    Service,
}

/// Outcome of one forecast refresh.
#[derive(Debug, Clone, Default)]
pub enum WeatherState {
    #[default]
    Loading,
    Success {
        snapshot: ForecastSnapshot,
        city_name: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl WeatherState {
    pub fn from_failure(err: &WeatherError) -> Self {
        let kind = if err.is_connectivity() {
            ErrorKind::Offline
        } else {
            ErrorKind::Service
        };
        Self::Error {
            kind,
            message: err.user_message().to_string(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
