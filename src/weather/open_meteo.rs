//! `OpenMeteo` API client, response structures and field defaulting
//!
//! Every upstream field is modelled as optional. Reading a value goes through
//! [`series_value`] and [`Degradations::take`], which substitute a default and
//! remember which field was missing.

use std::collections::BTreeSet;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Result;
use crate::config::UpstreamConfig;
use crate::http::fetch_json;

/// Fields requested for the current-conditions snapshot
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";

/// Daily aggregates requested for a forecast
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunrise,sunset";

/// Hourly series requested for a forecast
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation_probability,wind_speed_10m,weather_code";

/// Unit selection shared by every forecast request
const UNITS: &str = "temperature_unit=fahrenheit&wind_speed_unit=mph";

/// A per-index upstream array whose elements may individually be null
pub type Series<T> = Option<Vec<Option<T>>>;

/// Forecast endpoint response
#[derive(Debug, Default, Deserialize)]
pub struct ForecastResponse {
    pub timezone: Option<String>,
    pub current: Option<CurrentData>,
    pub daily: Option<DailyData>,
    pub hourly: Option<HourlyData>,
}

/// Current-instant fields
#[derive(Debug, Default, Deserialize)]
pub struct CurrentData {
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub weather_code: Option<f64>,
    pub wind_speed_10m: Option<f64>,
}

/// Daily aggregate arrays
#[derive(Debug, Default, Deserialize)]
pub struct DailyData {
    pub time: Option<Vec<String>>,
    pub weather_code: Series<f64>,
    pub temperature_2m_max: Series<f64>,
    pub temperature_2m_min: Series<f64>,
    pub precipitation_probability_max: Series<f64>,
    pub sunrise: Series<String>,
    pub sunset: Series<String>,
}

/// Flat hourly arrays spanning the whole forecast horizon
#[derive(Debug, Default, Deserialize)]
pub struct HourlyData {
    pub time: Option<Vec<String>>,
    pub temperature_2m: Series<f64>,
    pub relative_humidity_2m: Series<f64>,
    pub apparent_temperature: Series<f64>,
    pub precipitation_probability: Series<f64>,
    pub wind_speed_10m: Series<f64>,
    pub weather_code: Series<f64>,
}

/// Geocoding search response
#[derive(Debug, Default, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingResult {
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub timezone: Option<String>,
}

/// Element `index` of a series, if both the series and the element exist
#[must_use]
pub fn series_value<T: Clone>(series: &Series<T>, index: usize) -> Option<T> {
    series.as_ref()?.get(index)?.clone()
}

/// Round a Fahrenheit / mph / percent reading to the nearest integer, ties to even
#[must_use]
pub fn round_reading(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Tracks upstream fields that had to be replaced by a default
#[derive(Debug, Default)]
pub struct Degradations {
    fields: BTreeSet<&'static str>,
}

impl Degradations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap `value`, falling back to the type default and recording `field`
    pub fn take<T: Default>(&mut self, field: &'static str, value: Option<T>) -> T {
        match value {
            Some(value) => value,
            None => {
                self.fields.insert(field);
                T::default()
            }
        }
    }

    /// Record a field that was absent as a whole
    pub fn record(&mut self, field: &'static str) {
        self.fields.insert(field);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the degraded fields, sorted
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.fields.iter().copied().collect()
    }

    /// Emit one warning naming every degraded field
    pub fn report(&self, context: &str) {
        if !self.is_empty() {
            warn!(
                context,
                fields = ?self.fields(),
                "Upstream data incomplete, defaults substituted"
            );
        }
    }
}

/// Thin client over the Open-Meteo geocoding and forecast endpoints
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    geocoding_base_url: String,
    forecast_base_url: String,
}

impl OpenMeteoClient {
    #[must_use]
    pub fn new(client: Client, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            geocoding_base_url: upstream.geocoding_base_url.trim_end_matches('/').to_string(),
            forecast_base_url: upstream.forecast_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search places by name, returning at most `count` matches in upstream order
    pub async fn search(&self, name: &str, count: u8) -> Result<Vec<GeocodingResult>> {
        let url = format!(
            "{}/search?name={}&count={}&language=en&format=json",
            self.geocoding_base_url,
            urlencoding::encode(name),
            count
        );
        debug!("OpenMeteo geocoding request URL: {}", url);

        let response: GeocodingResponse = fetch_json(self.client.get(&url)).await?;
        Ok(response.results.unwrap_or_default())
    }

    /// Fetch the current-conditions snapshot for coordinates
    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<ForecastResponse> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current={}&{}&timezone=auto",
            self.forecast_base_url, latitude, longitude, CURRENT_FIELDS, UNITS
        );
        debug!("OpenMeteo current request URL: {}", url);

        fetch_json(self.client.get(&url)).await
    }

    /// Fetch `days` of daily aggregates and the matching hourly series
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
        timezone: &str,
    ) -> Result<ForecastResponse> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily={}&hourly={}&{}&timezone={}&forecast_days={}",
            self.forecast_base_url,
            latitude,
            longitude,
            DAILY_FIELDS,
            HOURLY_FIELDS,
            UNITS,
            urlencoding::encode(timezone),
            days
        );
        debug!("OpenMeteo forecast request URL: {}", url);

        fetch_json(self.client.get(&url)).await
    }
}
