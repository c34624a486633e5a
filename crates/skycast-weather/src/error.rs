//! Weather-domain error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport-level failure: unreachable host, timeout, reset.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("Weather service returned status {0}")]
    Remote(u16),

    /// The payload arrived but could not be turned into a snapshot.
    #[error("Malformed weather payload: {0}")]
    Decode(String),

    /// The live fetch failed and no cached snapshot could stand in.
    /// Carries the fetch failure as its cause.
    #[error("No cached forecast; live fetch failed: {source}")]
    CacheMiss { source: Box<WeatherError> },
}

impl WeatherError {
    /// True for "no connectivity" failures the UI renders differently from
    /// service-side trouble. Recurses through `CacheMiss` to classify the
    /// underlying fetch failure.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Network(e) => e.is_connect() || e.is_timeout(),
            Self::CacheMiss { source } => source.is_connectivity(),
            Self::Remote(_) | Self::Decode(_) => false,
        }
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        if self.is_connectivity() {
            return "Unable to connect. Check your internet connection.";
        }
        match self {
            Self::Network(_) => "The request failed. Please try again.",
            Self::Remote(status) if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            Self::Remote(_) => "The weather request failed. Please try again.",
            Self::Decode(_) => "Received an unexpected response from the weather service.",
            Self::CacheMiss { source } => source.user_message(),
        }
    }
}
