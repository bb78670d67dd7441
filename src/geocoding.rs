//! Location Resolution Module
//!
//! Resolves free-text place names into structured `Location`s and produces
//! autocomplete suggestions for the city search box.

use tracing::{debug, instrument};

use crate::Result;
use crate::models::{GeocodeSuggestion, Location};
use crate::weather::open_meteo::{GeocodingResult, OpenMeteoClient};

/// Queries shorter than this produce no suggestions
pub const MIN_QUERY_CHARS: usize = 2;

/// Matches requested when resolving a single place
const RESOLVE_COUNT: u8 = 1;

/// Matches requested for autocomplete
const SUGGEST_COUNT: u8 = 5;

/// Service for resolving place names
#[derive(Debug, Clone)]
pub struct Geocoder {
    api: OpenMeteoClient,
}

impl Geocoder {
    #[must_use]
    pub fn new(api: OpenMeteoClient) -> Self {
        Self { api }
    }

    /// Resolve a place name to its best match, or `None` if nothing matched
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> Result<Option<Location>> {
        debug!("Geocoding location name: {}", name);

        let results = self.api.search(name, RESOLVE_COUNT).await?;

        // Upstream ordering decides: first match wins
        let Some(best) = results.into_iter().next() else {
            debug!("No geocoding results for {}", name);
            return Ok(None);
        };

        let location = Location::from(best);
        debug!(
            "Found location: {} ({})",
            location.name,
            location.format_coordinates()
        );
        Ok(Some(location))
    }

    /// Autocomplete suggestions for a partial place name
    #[instrument(skip(self))]
    pub async fn suggest(&self, query: &str) -> Result<Vec<GeocodeSuggestion>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let results = self.api.search(query, SUGGEST_COUNT).await?;
        debug!("{} suggestions for {:?}", results.len(), query);

        Ok(results.into_iter().map(GeocodeSuggestion::from).collect())
    }
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        let mut location = Location::new(
            result.name,
            result.country.unwrap_or_default(),
            result.latitude,
            result.longitude,
        );
        location.admin1 = result.admin1;
        match result.timezone {
            Some(timezone) => location.with_timezone(timezone),
            None => location,
        }
    }
}

impl From<GeocodingResult> for GeocodeSuggestion {
    fn from(result: GeocodingResult) -> Self {
        GeocodeSuggestion::new(
            result.name,
            result.country.unwrap_or_default(),
            result.admin1.unwrap_or_default(),
            result.latitude,
            result.longitude,
        )
    }
}
