//! Weather Assistant - current conditions, forecasts and a chat front end
//!
//! This library geocodes free-text place names, fetches and normalizes
//! Open-Meteo weather data, finds matching city photos and serves it all
//! over a small JSON API with a tool-using conversational assistant.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod models;
pub mod photos;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use chat::WeatherAssistant;
pub use config::AppConfig;
pub use error::WeatherAppError;
pub use geocoding::Geocoder;
pub use models::{CurrentReport, ForecastReport, GeocodeSuggestion, Location};
pub use photos::PhotoSearch;
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherAppError>;
