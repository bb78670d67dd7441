//! Weather tool dispatch for the assistant.
//!
//! Maps tool names to [`WeatherService`] calls and renders each outcome as a
//! `tool_result` block.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::claude::{ContentBlock, ToolDefinition};
use crate::weather::WeatherService;

pub const GET_WEATHER: &str = "get_weather";
pub const GET_FORECAST: &str = "get_forecast";

/// Forecast length used when the model does not ask for one
pub const DEFAULT_TOOL_DAYS: i64 = 3;

/// Dispatches tool calls to the weather service.
#[derive(Debug, Clone)]
pub struct WeatherTools {
    weather: WeatherService,
}

impl WeatherTools {
    pub fn new(weather: WeatherService) -> Self {
        Self { weather }
    }

    /// Claude-compatible definitions for both weather tools.
    pub fn tool_definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: GET_WEATHER.to_string(),
                description: "Get the current weather for a city: temperature, feels-like \
                    temperature, humidity, wind speed and conditions. Temperatures are in \
                    Fahrenheit and wind speed in mph."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "City name (e.g., \"Miami\", \"Paris\")"
                        }
                    },
                    "required": ["city"]
                }),
            },
            ToolDefinition {
                name: GET_FORECAST.to_string(),
                description: "Get a daily weather forecast for a city with highs, lows, \
                    conditions, chance of rain, sunrise and sunset."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "City name (e.g., \"Miami\", \"Paris\")"
                        },
                        "days": {
                            "type": "integer",
                            "description": "Number of days to forecast (1-7, default 3)"
                        }
                    },
                    "required": ["city"]
                }),
            },
        ]
    }

    /// Execute one tool call and wrap the outcome as a `tool_result` block.
    pub async fn call_tool(&self, tool_use_id: &str, name: &str, input: &Value) -> ContentBlock {
        debug!(tool = name, %input, "Dispatching tool call");

        let (text, is_error) = match name {
            GET_WEATHER => self.handle_get_weather(input).await,
            GET_FORECAST => self.handle_get_forecast(input).await,
            _ => (format!("Unknown tool: {}", name), Some(true)),
        };

        if is_error == Some(true) {
            warn!(tool = name, "Tool call failed: {}", text);
        }

        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: text,
            is_error,
        }
    }

    async fn handle_get_weather(&self, input: &Value) -> (String, Option<bool>) {
        let Some(city) = city_param(input) else {
            return missing_city();
        };

        match self.weather.current_for_city(city).await {
            Ok(Some(report)) => render(&report),
            Ok(None) => (city_not_found(city), None),
            Err(e) => (format!("Error fetching weather: {}", e), Some(true)),
        }
    }

    async fn handle_get_forecast(&self, input: &Value) -> (String, Option<bool>) {
        let Some(city) = city_param(input) else {
            return missing_city();
        };
        let days = days_param(input);

        match self.weather.forecast_for_city(city, days).await {
            Ok(Some(report)) => render(&report),
            Ok(None) => (city_not_found(city), None),
            Err(e) => (format!("Error fetching forecast: {}", e), Some(true)),
        }
    }
}

fn city_param(input: &Value) -> Option<&str> {
    input
        .get("city")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

/// Requested forecast length; accepts integers, whole floats and numeric strings
fn days_param(input: &Value) -> i64 {
    let parsed = match input.get("days") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    };
    parsed.unwrap_or(DEFAULT_TOOL_DAYS)
}

fn missing_city() -> (String, Option<bool>) {
    ("Missing required parameter: city".to_string(), Some(true))
}

fn city_not_found(city: &str) -> String {
    format!(
        "Sorry, I couldn't find the city '{}'. Please check the spelling and try again.",
        city
    )
}

fn render<T: Serialize>(report: &T) -> (String, Option<bool>) {
    match serde_json::to_string_pretty(report) {
        Ok(text) => (text, None),
        Err(e) => (format!("Error formatting result: {}", e), Some(true)),
    }
}
