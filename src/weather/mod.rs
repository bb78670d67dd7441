//! Weather normalization
//!
//! Turns Open-Meteo responses into the rounded, human-readable shapes served
//! to the frontend and the chat tools. Fetching lives in [`open_meteo`], the
//! code table in [`conditions`].

use chrono_tz::Tz;
use tracing::{info, instrument};

use crate::Result;
use crate::geocoding::Geocoder;
use crate::models::{
    CurrentConditions, CurrentReport, DailyForecastEntry, ForecastReport, HourlyEntry, Location,
};

pub mod conditions;
pub mod open_meteo;

use conditions::condition_text;
use open_meteo::{
    CurrentData, DailyData, Degradations, ForecastResponse, HourlyData, OpenMeteoClient,
    round_reading, series_value,
};

/// Fewest forecast days that can be requested
pub const MIN_FORECAST_DAYS: u8 = 1;

/// Most forecast days that can be requested
pub const MAX_FORECAST_DAYS: u8 = 7;

/// Hourly records per forecast day
pub const HOURS_PER_DAY: usize = 24;

/// Clamp a caller-supplied day count into the supported range
#[must_use]
pub fn clamp_days(requested: i64) -> u8 {
    let clamped = requested.clamp(i64::from(MIN_FORECAST_DAYS), i64::from(MAX_FORECAST_DAYS));
    u8::try_from(clamped).unwrap_or(MAX_FORECAST_DAYS)
}

/// Timezone parameter for a forecast: the geocoded IANA zone when valid, else `auto`
#[must_use]
pub fn forecast_timezone(location: &Location) -> String {
    location
        .timezone
        .as_deref()
        .filter(|tz| tz.parse::<Tz>().is_ok())
        .map_or_else(|| "auto".to_string(), str::to_string)
}

/// Normalize a current-conditions snapshot
#[must_use]
pub fn normalize_current(
    current: Option<&CurrentData>,
    degradations: &mut Degradations,
) -> CurrentConditions {
    let Some(current) = current else {
        degradations.record("current");
        return normalize_current(Some(&CurrentData::default()), degradations);
    };

    let code = round_reading(degradations.take("current.weather_code", current.weather_code));

    CurrentConditions {
        temperature: round_reading(degradations.take("current.temperature_2m", current.temperature_2m)),
        feels_like: round_reading(
            degradations.take("current.apparent_temperature", current.apparent_temperature),
        ),
        humidity: round_reading(
            degradations.take("current.relative_humidity_2m", current.relative_humidity_2m),
        ),
        wind_speed: round_reading(degradations.take("current.wind_speed_10m", current.wind_speed_10m)),
        condition_code: code,
        condition: condition_text(code).to_string(),
    }
}

/// Hourly records `[start, end)` truncated to the length of the upstream time array
#[must_use]
pub fn hourly_range(
    hourly: Option<&HourlyData>,
    start: usize,
    end: usize,
    degradations: &mut Degradations,
) -> Vec<HourlyEntry> {
    let Some(hourly) = hourly else {
        return Vec::new();
    };
    let Some(times) = hourly.time.as_ref() else {
        degradations.record("hourly.time");
        return Vec::new();
    };

    let end = end.min(times.len());
    (start.min(end)..end)
        .map(|i| {
            let code = round_reading(degradations.take(
                "hourly.weather_code",
                series_value(&hourly.weather_code, i),
            ));
            HourlyEntry {
                time: times[i].clone(),
                temperature: round_reading(degradations.take(
                    "hourly.temperature_2m",
                    series_value(&hourly.temperature_2m, i),
                )),
                feels_like: round_reading(degradations.take(
                    "hourly.apparent_temperature",
                    series_value(&hourly.apparent_temperature, i),
                )),
                humidity: round_reading(degradations.take(
                    "hourly.relative_humidity_2m",
                    series_value(&hourly.relative_humidity_2m, i),
                )),
                rain_chance: round_reading(degradations.take(
                    "hourly.precipitation_probability",
                    series_value(&hourly.precipitation_probability, i),
                )),
                wind_speed: round_reading(degradations.take(
                    "hourly.wind_speed_10m",
                    series_value(&hourly.wind_speed_10m, i),
                )),
                condition: condition_text(code).to_string(),
            }
        })
        .collect()
}

/// Hourly bucket aligned to daily index `day`
#[must_use]
pub fn hourly_bucket(
    hourly: Option<&HourlyData>,
    day: usize,
    degradations: &mut Degradations,
) -> Vec<HourlyEntry> {
    let start = day * HOURS_PER_DAY;
    hourly_range(hourly, start, start + HOURS_PER_DAY, degradations)
}

fn daily_entry(
    daily: &DailyData,
    hourly: Option<&HourlyData>,
    day: usize,
    date: &str,
    degradations: &mut Degradations,
) -> DailyForecastEntry {
    let code = round_reading(degradations.take(
        "daily.weather_code",
        series_value(&daily.weather_code, day),
    ));

    DailyForecastEntry {
        date: date.to_string(),
        high: round_reading(degradations.take(
            "daily.temperature_2m_max",
            series_value(&daily.temperature_2m_max, day),
        )),
        low: round_reading(degradations.take(
            "daily.temperature_2m_min",
            series_value(&daily.temperature_2m_min, day),
        )),
        condition_code: code,
        condition: condition_text(code).to_string(),
        rain_chance: round_reading(degradations.take(
            "daily.precipitation_probability_max",
            series_value(&daily.precipitation_probability_max, day),
        )),
        sunrise: degradations.take("daily.sunrise", series_value(&daily.sunrise, day)),
        sunset: degradations.take("daily.sunset", series_value(&daily.sunset, day)),
        hourly: hourly_bucket(hourly, day, degradations),
    }
}

/// Normalize a forecast response for `days` (already clamped) days
#[must_use]
pub fn normalize_forecast(
    location: &Location,
    response: &ForecastResponse,
    days: u8,
    requested_timezone: &str,
    degradations: &mut Degradations,
) -> ForecastReport {
    let hourly = response.hourly.as_ref();
    if hourly.is_none() {
        degradations.record("hourly");
    }

    let forecast = match response.daily.as_ref() {
        Some(daily) => match daily.time.as_ref() {
            Some(dates) => dates
                .iter()
                .take(usize::from(days))
                .enumerate()
                .map(|(day, date)| daily_entry(daily, hourly, day, date, degradations))
                .collect(),
            None => {
                degradations.record("daily.time");
                Vec::new()
            }
        },
        None => {
            degradations.record("daily");
            Vec::new()
        }
    };

    ForecastReport {
        city: location.name.clone(),
        country: location.country.clone(),
        timezone: response
            .timezone
            .clone()
            .unwrap_or_else(|| requested_timezone.to_string()),
        forecast,
        hourly: hourly_range(hourly, 0, HOURS_PER_DAY, degradations),
    }
}

/// Geocoding plus weather lookups, composed per request
#[derive(Debug, Clone)]
pub struct WeatherService {
    api: OpenMeteoClient,
    geocoder: Geocoder,
}

impl WeatherService {
    #[must_use]
    pub fn new(api: OpenMeteoClient) -> Self {
        Self {
            geocoder: Geocoder::new(api.clone()),
            api,
        }
    }

    #[must_use]
    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Current conditions at a resolved location
    #[instrument(skip(self, location), fields(city = %location.name))]
    pub async fn current(&self, location: &Location) -> Result<CurrentConditions> {
        let response = self.api.current(location.latitude, location.longitude).await?;

        let mut degradations = Degradations::new();
        let conditions = normalize_current(response.current.as_ref(), &mut degradations);
        degradations.report("current");
        Ok(conditions)
    }

    /// Forecast at a resolved location; `requested_days` is clamped to 1..=7
    #[instrument(skip(self, location), fields(city = %location.name))]
    pub async fn forecast(&self, location: &Location, requested_days: i64) -> Result<ForecastReport> {
        let days = clamp_days(requested_days);
        let timezone = forecast_timezone(location);
        let response = self
            .api
            .forecast(location.latitude, location.longitude, days, &timezone)
            .await?;

        let mut degradations = Degradations::new();
        let report = normalize_forecast(location, &response, days, &timezone, &mut degradations);
        degradations.report("forecast");
        Ok(report)
    }

    /// Geocode `city`, then fetch its current conditions; `None` if the city is unknown
    pub async fn current_for_city(&self, city: &str) -> Result<Option<CurrentReport>> {
        info!("Getting current weather for {}", city);

        let Some(location) = self.geocoder.resolve(city).await? else {
            return Ok(None);
        };
        let conditions = self.current(&location).await?;
        let report = CurrentReport::new(&location, conditions);
        info!("Current weather: {}", report.summary());
        Ok(Some(report))
    }

    /// Geocode `city`, then fetch its forecast; `None` if the city is unknown
    pub async fn forecast_for_city(
        &self,
        city: &str,
        requested_days: i64,
    ) -> Result<Option<ForecastReport>> {
        info!("Getting {}-day forecast for {}", requested_days, city);

        let Some(location) = self.geocoder.resolve(city).await? else {
            return Ok(None);
        };
        let report = self.forecast(&location, requested_days).await?;
        info!("Forecast for {} has {} days", report.city, report.days());
        Ok(Some(report))
    }
}
