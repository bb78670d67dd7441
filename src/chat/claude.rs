//! Raw reqwest Claude API client with tool_use support.
//!
//! Minimal client for the Anthropic Messages API: text messages and tool use,
//! single request/response, no streaming.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ChatConfig;
use crate::{Result, WeatherAppError};

/// API version header value.
const API_VERSION: &str = "2023-06-01";

// ── Content blocks ──────────────────────────────────────────────────

/// A single content block in a message (text, tool_use, or tool_result).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },

    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

// ── Message ─────────────────────────────────────────────────────────

/// A conversation message with role and content blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message from plain text.
    pub fn user(text: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
        }
    }

    /// Create an assistant message echoing the model's content blocks.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
        }
    }

    /// Create a user message carrying tool results.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content: results,
        }
    }

    /// Concatenate all text blocks into a single string.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all tool_use blocks as `(id, name, input)` tuples.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }
}

// ── Tool definition ─────────────────────────────────────────────────

/// A tool definition for the Claude API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

// ── API request/response ────────────────────────────────────────────

/// Wire format for the Messages API request (not public).
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "<[ToolDefinition]>::is_empty")]
    tools: &'a [ToolDefinition],
}

/// Token usage from the API response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Wire format for the Messages API response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

impl ApiResponse {
    /// Whether the model stopped to ask for tool calls.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
    }

    /// The response content as an assistant message.
    pub fn into_message(self) -> Message {
        Message::assistant(self.content)
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// A minimal Claude API client.
#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for ClaudeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl ClaudeClient {
    /// Create a client from chat settings; fails when no API key is configured.
    pub fn new(client: Client, config: &ChatConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| WeatherAppError::config("ANTHROPIC_API_KEY not set"))?;

        Ok(Self {
            client,
            url: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a conversation to the Messages API.
    pub async fn send(
        &self,
        system: Option<&str>,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ApiResponse> {
        let body = ApiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages,
            tools,
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(WeatherAppError::chat(format!(
                "API error (status {}): {}",
                status.as_u16(),
                message
            )));
        }

        let api_response: ApiResponse = response.json().await?;
        tracing::debug!(
            id = %api_response.id,
            stop_reason = ?api_response.stop_reason,
            input_tokens = api_response.usage.input_tokens,
            output_tokens = api_response.usage.output_tokens,
            "Claude response"
        );
        Ok(api_response)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, api_key: Option<&str>) -> ChatConfig {
        ChatConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            ..ChatConfig::default()
        }
    }

    #[test]
    fn message_text_concatenation() {
        let msg = Message::assistant(vec![
            ContentBlock::Text {
                text: "Hello ".to_string(),
            },
            ContentBlock::ToolUse {
                id: "t1".to_string(),
                name: "get_weather".to_string(),
                input: json!({}),
            },
            ContentBlock::Text {
                text: "world".to_string(),
            },
        ]);
        assert_eq!(msg.text(), "Hello world");
    }

    #[test]
    fn message_tool_uses_extraction() {
        let msg = Message::assistant(vec![
            ContentBlock::Text {
                text: "Let me check.".to_string(),
            },
            ContentBlock::ToolUse {
                id: "tu_1".to_string(),
                name: "get_weather".to_string(),
                input: json!({"city": "Miami"}),
            },
            ContentBlock::ToolUse {
                id: "tu_2".to_string(),
                name: "get_forecast".to_string(),
                input: json!({"city": "Miami", "days": 2}),
            },
        ]);

        let uses = msg.tool_uses();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].0, "tu_1");
        assert_eq!(uses[0].1, "get_weather");
        assert_eq!(uses[0].2, &json!({"city": "Miami"}));
        assert_eq!(uses[1].1, "get_forecast");
    }

    #[test]
    fn tool_result_omits_missing_error_flag() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_xyz".to_string(),
            content: "ok".to_string(),
            is_error: None,
        };
        let json = serde_json::to_string(&block).unwrap();
        assert!(!json.contains("is_error"));
        assert!(json.contains(r#""type":"tool_result""#));
    }

    #[test]
    fn api_response_deserialization() {
        let json_str = r#"{
            "id": "msg_01XFDUDYJgAACzvnptvVoYEL",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-haiku-20241022",
            "content": [
                {"type": "text", "text": "Checking the weather."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {"city": "Miami"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 40}
        }"#;
        let response: ApiResponse = serde_json::from_str(json_str).unwrap();
        assert!(response.wants_tools());
        assert_eq!(response.usage.input_tokens, 120);
        let message = response.into_message();
        assert_eq!(message.role, "assistant");
        assert_eq!(message.tool_uses().len(), 1);
    }

    #[test]
    fn client_requires_api_key() {
        let err = ClaudeClient::new(Client::new(), &config("http://localhost", None)).unwrap_err();
        assert!(matches!(err, WeatherAppError::Config { .. }));

        let err =
            ClaudeClient::new(Client::new(), &config("http://localhost", Some(""))).unwrap_err();
        assert!(matches!(err, WeatherAppError::Config { .. }));
    }

    #[tokio::test]
    async fn send_posts_messages_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "model": "claude-3-5-haiku-20241022",
                "system": "be brief",
                "messages": [{"role": "user", "content": [{"type": "text", "text": "hi"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "hello"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 5, "output_tokens": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClaudeClient::new(Client::new(), &config(&server.uri(), Some("sk-test"))).unwrap();
        let response = client
            .send(Some("be brief"), &[Message::user("hi")], &[])
            .await
            .unwrap();
        assert!(!response.wants_tools());
        assert_eq!(response.into_message().text(), "hello");
    }

    #[tokio::test]
    async fn send_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(Client::new(), &config(&server.uri(), Some("sk-test"))).unwrap();
        let err = client.send(None, &[Message::user("hi")], &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Chat error: API error (status 429): rate limited");
    }
}
