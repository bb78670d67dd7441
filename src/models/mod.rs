//! Data models for the weather assistant
//!
//! This module contains the request-scoped domain models organized by concern:
//! - Location: Geocoded place and autocomplete suggestions
//! - Weather: Current conditions snapshot
//! - Forecast: Daily and hourly forecast entries

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{DailyForecastEntry, ForecastReport, HourlyEntry};
pub use location::{GeocodeSuggestion, Location};
pub use weather::{CurrentConditions, CurrentReport};
