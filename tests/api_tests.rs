//! Router tests for the `/api` surface, with Open-Meteo mocked

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_assistant::config::{AppConfig, PhotosConfig, ServerConfig, UpstreamConfig};
use weather_assistant::weather::open_meteo::OpenMeteoClient;
use weather_assistant::{AppState, PhotoSearch, WeatherService, web};

fn app(server: &MockServer) -> Router {
    app_with_server_config(server, AppConfig::default().server)
}

fn app_with_server_config(server: &MockServer, server_config: ServerConfig) -> Router {
    let upstream = UpstreamConfig {
        geocoding_base_url: server.uri(),
        forecast_base_url: server.uri(),
        ..UpstreamConfig::default()
    };
    let photos = PhotosConfig {
        base_url: server.uri(),
        access_key: None,
    };
    let client = reqwest::Client::new();
    let state = AppState {
        weather: WeatherService::new(OpenMeteoClient::new(client.clone(), &upstream)),
        photos: PhotoSearch::new(client, &photos),
        assistant: None,
        model: "test-model".to_string(),
    };
    web::app(state, &server_config)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let cors = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body, cors)
}

async fn mount_city(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"name": name, "country": "United States", "admin1": "Florida",
                         "latitude": 25.77427, "longitude": -80.19366,
                         "timezone": "America/New_York"}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_root_and_health() {
    let server = MockServer::start().await;

    let (status, body, cors) = get(app(&server), "/api/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "AI Weather Assistant API");
    assert_eq!(cors.as_deref(), Some("*"));

    let (status, body, _) = get(app(&server), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["llm_configured"], false);
    assert_eq!(body["model"], "test-model");
}

#[tokio::test]
async fn test_weather_defaults_to_miami() {
    let server = MockServer::start().await;
    mount_city(&server, "Miami").await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "25.77427"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {"temperature_2m": 72.6, "relative_humidity_2m": 65.0,
                        "apparent_temperature": 72.4, "weather_code": 61.0,
                        "wind_speed_10m": 11.5}
        })))
        .mount(&server)
        .await;

    let (status, body, cors) = get(app(&server), "/api/weather").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cors.as_deref(), Some("*"));
    assert_eq!(body["city"], "Miami");
    assert_eq!(body["country"], "United States");
    assert_eq!(body["temperature"], 73);
    assert_eq!(body["feels_like"], 72);
    assert_eq!(body["humidity"], 65);
    assert_eq!(body["wind_speed"], 12);
    assert_eq!(body["condition"], "Slight rain");
    assert_eq!(body["latitude"], 25.77427);
}

#[tokio::test]
async fn test_unknown_city_is_ok_with_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body, _) = get(app(&server), "/api/weather/Atlantis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "City 'Atlantis' not found"}));

    let (status, body, _) = get(app(&server), "/api/forecast?city=Atlantis&days=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "City 'Atlantis' not found"}));
}

#[tokio::test]
async fn test_upstream_failure_is_json_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (status, body, cors) = get(app(&server), "/api/weather/Paris").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Request failed with status: 502"}));
    assert_eq!(cors.as_deref(), Some("*"));
}

#[tokio::test]
async fn test_malformed_days_is_json_400() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body, _) = get(app(&server), "/api/forecast/Miami?days=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("days"));
}

#[tokio::test]
async fn test_duplicate_query_field_is_json_400() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for uri in [
        "/api/forecast?city=Miami&days=1&days=2",
        "/api/forecast/Miami?days=1&days=2",
        "/api/weather?city=Miami&city=Paris",
        "/api/geocode?query=Mia&query=Lon",
        "/api/unsplash-photo/Miami?is_night=maybe",
    ] {
        let (status, body, cors) = get(app(&server), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
        assert_eq!(cors.as_deref(), Some("*"));
    }
}

#[tokio::test]
async fn test_invalid_utf8_path_is_json_400() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for uri in [
        "/api/weather/%FF",
        "/api/forecast/%FF",
        "/api/unsplash-photo/%FF",
    ] {
        let (status, body, _) = get(app(&server), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(
            body["error"].as_str().unwrap().contains("UTF-8"),
            "{uri}: {body}"
        );
    }
}

#[tokio::test]
async fn test_slow_upstream_hits_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let server_config = ServerConfig {
        request_timeout_seconds: 1,
        ..AppConfig::default().server
    };
    let (status, _, _) = get(
        app_with_server_config(&server, server_config),
        "/api/weather/Miami",
    )
    .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_forecast_path_clamps_days() {
    let server = MockServer::start().await;
    mount_city(&server, "Miami").await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("forecast_days", "7"))
        .and(query_param("timezone", "America/New_York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timezone": "America/New_York",
            "daily": {
                "time": ["2024-06-01"],
                "weather_code": [3.0],
                "temperature_2m_max": [88.5],
                "temperature_2m_min": [76.2],
                "precipitation_probability_max": [40.0],
                "sunrise": ["2024-06-01T06:29"],
                "sunset": ["2024-06-01T20:08"]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body, _) = get(app(&server), "/api/forecast/Miami?days=30").await;
    assert_eq!(status, StatusCode::OK);
    let day = &body["forecast"][0];
    assert_eq!(day["date"], "2024-06-01");
    assert_eq!(day["high"], 88);
    assert_eq!(day["low"], 76);
    assert_eq!(day["condition"], "Overcast");
    assert_eq!(day["rain_chance"], 40);
    assert_eq!(day["sunrise"], "2024-06-01T06:29");
}

#[tokio::test]
async fn test_geocode_short_query_returns_empty_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body, _) = get(app(&server), "/api/geocode?query=M").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"suggestions": []}));
}

#[tokio::test]
async fn test_geocode_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"name": "Miami", "country": "United States", "admin1": "Florida",
                         "latitude": 25.77427, "longitude": -80.19366}]
        })))
        .mount(&server)
        .await;

    let (status, body, _) = get(app(&server), "/api/geocode?query=Mia").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"][0]["display"], "Miami, Florida United States");
    assert_eq!(body["suggestions"][0]["admin1"], "Florida");
}

#[tokio::test]
async fn test_photo_without_key_reports_in_band() {
    let server = MockServer::start().await;

    let (status, body, _) = get(app(&server), "/api/unsplash-photo/Miami?weather=rain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"error": "Unsplash API key required", "photo_url": null})
    );
}

#[tokio::test]
async fn test_chat_without_assistant_is_503() {
    let server = MockServer::start().await;
    let resp = app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"message":"How's Miami?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_chat_rejects_bad_json() {
    let server = MockServer::start().await;
    let resp = app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"msg":1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
