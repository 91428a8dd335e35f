//! Error types shared by the location directory and the weather client.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification used by callers that only care where a lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be sent or no response arrived.
    Network,
    /// A response arrived but did not contain usable weather data.
    Data,
    /// The client is not set up to make requests at all.
    Config,
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected weather data: {0}")]
    Data(String),

    #[error("No OpenWeather API key configured")]
    MissingApiKey,
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::LocationNotFound(_) | Self::Status { .. } | Self::Data(_) => ErrorKind::Data,
            Self::MissingApiKey => ErrorKind::Config,
        }
    }

    /// User-friendly error message for inline display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network unavailable. Check your connection and try again.".to_string(),
            Self::LocationNotFound(location) => {
                format!("Location not found: {location}")
            }
            Self::Status { status: 401, .. } => {
                "The weather provider rejected the API key. Run `cityweather configure`.".to_string()
            }
            Self::Status { status, .. } => {
                format!("The weather provider is unavailable right now (status {status}).")
            }
            Self::Data(_) => "The weather provider sent data that could not be read.".to_string(),
            Self::MissingApiKey => {
                "No API key configured. Run `cityweather configure` first.".to_string()
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Failed to read location dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse location dataset: {0}")]
    Dataset(#[from] serde_json::Error),
}
