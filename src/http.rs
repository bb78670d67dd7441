//! Shared outbound HTTP client construction and JSON fetching

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::Result;
use crate::config::UpstreamConfig;

/// Build the process-wide HTTP client used for every upstream call
pub fn build_client(upstream: &UpstreamConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(upstream.timeout_seconds.into()))
        .user_agent(upstream.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Send a request and deserialize the JSON body, failing on non-success statuses
pub async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "upstream returned an error status");
        return Err(crate::WeatherAppError::upstream(status.as_u16(), body));
    }

    Ok(response.json::<T>().await?)
}
