//! Location model for geocoded places

use serde::{Deserialize, Serialize};

/// A place resolved by the geocoder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Canonical place name
    pub name: String,
    /// Country name, empty when upstream omits it
    pub country: String,
    /// First-level administrative area (state, province)
    pub admin1: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// IANA timezone reported by the geocoder
    pub timezone: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: impl Into<String>, country: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            admin1: None,
            latitude,
            longitude,
            timezone: None,
        }
    }

    /// Attach a timezone
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One autocomplete entry for the city search box
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodeSuggestion {
    pub name: String,
    pub country: String,
    pub admin1: String,
    pub latitude: f64,
    pub longitude: f64,
    /// "Name, Admin1 Country" label
    pub display: String,
}

impl GeocodeSuggestion {
    #[must_use]
    pub fn new(
        name: String,
        country: String,
        admin1: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let display = format!("{name}, {admin1} {country}").trim().to_string();
        Self {
            name,
            country,
            admin1,
            latitude,
            longitude,
            display,
        }
    }
}
