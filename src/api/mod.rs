//! HTTP handlers mounted under `/api`

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use crate::WeatherAppError;
use crate::chat::WeatherAssistant;
use crate::models::GeocodeSuggestion;
use crate::photos::{PhotoRequest, PhotoSearch};
use crate::weather::WeatherService;

/// City used when a request does not name one
pub const DEFAULT_CITY: &str = "Miami";

/// Forecast length used when a request does not ask for one
pub const DEFAULT_DAYS: i64 = 7;

/// Shared per-process services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherService,
    pub photos: PhotoSearch,
    pub assistant: Option<Arc<WeatherAssistant>>,
    pub model: String,
}

/// Error rendered as `{"error": ...}` with the matching status
#[derive(Debug)]
pub struct ApiError(WeatherAppError);

impl From<WeatherAppError> for ApiError {
    fn from(err: WeatherAppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }
        let message = match &self.0 {
            WeatherAppError::Chat { .. } | WeatherAppError::Io { .. } => self.0.user_message(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub city: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
    pub llm_connected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub llm_configured: bool,
    pub model: String,
    pub timestamp: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/weather", get(get_weather))
        .route("/weather/{city}", get(get_weather_path))
        .route("/forecast", get(get_forecast))
        .route("/forecast/{city}", get(get_forecast_path))
        .route("/geocode", get(geocode))
        .route("/unsplash-photo/{city}", get(get_unsplash_photo))
        .route("/chat", post(chat))
        .with_state(state)
}

fn city_or_default(city: Option<String>) -> String {
    city.map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CITY.to_string())
}

fn parse_days(days: Option<&str>) -> Result<i64, WeatherAppError> {
    match days.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(DEFAULT_DAYS),
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| WeatherAppError::validation(format!("days must be an integer, got '{raw}'"))),
    }
}

/// Unwrap query parameters, turning axum's plain-text rejection into a JSON 400
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, WeatherAppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| WeatherAppError::validation(rejection.body_text()))
}

/// Unwrap the `{city}` path segment, turning axum's plain-text rejection into a JSON 400
fn path_city(city: Result<Path<String>, PathRejection>) -> Result<String, WeatherAppError> {
    city.map(|Path(city)| city)
        .map_err(|rejection| WeatherAppError::validation(rejection.body_text()))
}

fn not_found(city: &str) -> Response {
    Json(json!({ "error": format!("City '{}' not found", city) })).into_response()
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "AI Weather Assistant API", "docs": "/api/health" }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        llm_configured: state.assistant.is_some(),
        model: state.model.clone(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn current_weather(state: &AppState, city: &str) -> ApiResult {
    match state.weather.current_for_city(city).await? {
        Some(report) => Ok(Json(report).into_response()),
        None => Ok(not_found(city)),
    }
}

async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> ApiResult {
    let query = query_params(query)?;
    let city = city_or_default(query.city);
    current_weather(&state, &city).await
}

async fn get_weather_path(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let city = path_city(city)?;
    current_weather(&state, &city).await
}

async fn forecast(state: &AppState, city: &str, days: Option<&str>) -> ApiResult {
    let days = parse_days(days)?;
    match state.weather.forecast_for_city(city, days).await? {
        Some(report) => Ok(Json(report).into_response()),
        None => Ok(not_found(city)),
    }
}

async fn get_forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> ApiResult {
    let query = query_params(query)?;
    let city = city_or_default(query.city);
    forecast(&state, &city, query.days.as_deref()).await
}

async fn get_forecast_path(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> ApiResult {
    let city = path_city(city)?;
    let query = query_params(query)?;
    forecast(&state, &city, query.days.as_deref()).await
}

async fn geocode(
    State(state): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> ApiResult {
    let query = query_params(query)?;
    // Autocomplete degrades to an empty list instead of failing the search box
    let suggestions: Vec<GeocodeSuggestion> =
        match state.weather.geocoder().suggest(&query.query).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!(error = %e, query = %query.query, "Geocoding suggestions failed");
                Vec::new()
            }
        };
    Ok(Json(json!({ "suggestions": suggestions })).into_response())
}

async fn get_unsplash_photo(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
    query: Result<Query<PhotoRequest>, QueryRejection>,
) -> ApiResult {
    let city = path_city(city)?;
    let request = query_params(query)?;
    Ok(Json(state.photos.photo_for_city(&city, &request).await).into_response())
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) =
        payload.map_err(|rejection| WeatherAppError::validation(rejection.body_text()))?;
    if request.message.trim().is_empty() {
        return Err(WeatherAppError::validation("message must not be empty").into());
    }

    let Some(assistant) = state.assistant.as_ref() else {
        return Err(WeatherAppError::config("chat assistant is not configured (ANTHROPIC_API_KEY not set)").into());
    };

    let response = assistant.reply(&request.message).await?;
    Ok((
        StatusCode::OK,
        Json(ChatResponse {
            response,
            timestamp: Utc::now().to_rfc3339(),
            llm_connected: true,
        }),
    )
        .into_response())
}
