use std::sync::Arc;

use anyhow::{Context, Result};

use weather_assistant::weather::open_meteo::OpenMeteoClient;
use weather_assistant::{
    AppConfig, AppState, PhotoSearch, VERSION, WeatherAssistant, WeatherService, http, telemetry,
    web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let _telemetry = telemetry::init(&config.logging).context("failed to initialize logging")?;

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    tracing::info!(version = VERSION, "Starting weather assistant");

    let client = http::build_client(&config.upstream).context("failed to build HTTP client")?;
    let weather = WeatherService::new(OpenMeteoClient::new(client.clone(), &config.upstream));
    let photos = PhotoSearch::new(client.clone(), &config.photos);

    let assistant = match WeatherAssistant::new(client, &config.chat, weather.clone()) {
        Ok(assistant) => {
            tracing::info!(model = assistant.model(), "Chat assistant enabled");
            Some(Arc::new(assistant))
        }
        Err(e) => {
            tracing::warn!("Chat assistant disabled: {}", e);
            None
        }
    };

    let state = AppState {
        weather,
        photos,
        assistant,
        model: config.chat.model.clone(),
    };

    web::run(&config, state).await.context("server error")?;
    tracing::info!("Server stopped");
    Ok(())
}
