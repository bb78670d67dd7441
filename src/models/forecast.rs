//! Forecast models

use serde::{Deserialize, Serialize};

/// One hour of forecast detail
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyEntry {
    /// Local timestamp as returned upstream (`YYYY-MM-DDTHH:MM`)
    pub time: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: i64,
    /// Precipitation probability in percent
    pub rain_chance: i64,
    pub wind_speed: i64,
    pub condition: String,
}

/// Aggregates for one forecast day plus its hourly bucket
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecastEntry {
    /// Local date (`YYYY-MM-DD`)
    pub date: String,
    pub high: i64,
    pub low: i64,
    pub condition_code: i64,
    pub condition: String,
    /// Maximum precipitation probability in percent
    pub rain_chance: i64,
    pub sunrise: String,
    pub sunset: String,
    pub hourly: Vec<HourlyEntry>,
}

/// Multi-day forecast for a geocoded place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastReport {
    pub city: String,
    pub country: String,
    pub timezone: String,
    pub forecast: Vec<DailyForecastEntry>,
    /// The next 24 hourly records
    pub hourly: Vec<HourlyEntry>,
}

impl ForecastReport {
    /// Number of forecast days
    #[must_use]
    pub fn days(&self) -> usize {
        self.forecast.len()
    }
}
