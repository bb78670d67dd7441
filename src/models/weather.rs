//! Current conditions model

use serde::{Deserialize, Serialize};

use super::Location;

/// Normalized snapshot of the current weather
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Temperature in °F, rounded
    pub temperature: i64,
    /// Apparent temperature in °F, rounded
    pub feels_like: i64,
    /// Relative humidity in percent
    pub humidity: i64,
    /// Wind speed in mph, rounded
    pub wind_speed: i64,
    /// Raw upstream weather code
    pub condition_code: i64,
    /// Human-readable condition
    pub condition: String,
}

/// Current conditions together with the place they were fetched for
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentReport {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub conditions: CurrentConditions,
}

impl CurrentReport {
    #[must_use]
    pub fn new(location: &Location, conditions: CurrentConditions) -> Self {
        Self {
            city: location.name.clone(),
            country: location.country.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            conditions,
        }
    }

    /// Format a one-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}, {}: {}°F (feels like {}°F), {}, humidity {}%, wind {} mph",
            self.city,
            self.country,
            self.conditions.temperature,
            self.conditions.feels_like,
            self.conditions.condition,
            self.conditions.humidity,
            self.conditions.wind_speed
        )
    }
}
