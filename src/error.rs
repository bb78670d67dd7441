//! Error types and handling for the weather assistant

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for the weather assistant
#[derive(Error, Debug)]
pub enum WeatherAppError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// An upstream service answered with a non-success status
    #[error("Request failed with status: {status}")]
    Upstream { status: u16, body: String },

    /// Transport or decoding failure talking to an upstream service
    #[error("{source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// Conversational model errors
    #[error("Chat error: {message}")]
    Chat { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherAppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new upstream status error
    pub fn upstream<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Create a new chat error
    pub fn chat<S: Into<String>>(message: S) -> Self {
        Self::Chat {
            message: message.into(),
        }
    }

    /// HTTP status used when this error reaches a client
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            WeatherAppError::Validation { .. } => StatusCode::BAD_REQUEST,
            WeatherAppError::Config { .. } => StatusCode::SERVICE_UNAVAILABLE,
            WeatherAppError::Upstream { .. }
            | WeatherAppError::Http { .. }
            | WeatherAppError::Chat { .. }
            | WeatherAppError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherAppError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            WeatherAppError::Upstream { .. } | WeatherAppError::Http { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            WeatherAppError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WeatherAppError::Chat { .. } => {
                "The assistant could not answer right now. Please try again later.".to_string()
            }
            WeatherAppError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
