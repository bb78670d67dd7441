//! Conversational weather assistant
//!
//! Wraps the Claude Messages API with the `get_weather` and `get_forecast`
//! tools. One [`WeatherAssistant`] is built at startup and shared by the
//! HTTP layer.

pub mod claude;
pub mod tools;

use tracing::{info, instrument, warn};

use crate::Result;
use crate::config::ChatConfig;
use crate::weather::WeatherService;
use claude::{ClaudeClient, ContentBlock, Message, ToolDefinition};
use tools::WeatherTools;

/// System prompt given to the model on every turn
pub const SYSTEM_PROMPT: &str = "You are a friendly weather assistant. \
Use the get_weather tool for current conditions and the get_forecast tool for \
multi-day forecasts. Present the results conversationally with a few fitting \
emojis, use Fahrenheit and mph, and mention that the data is live. If a city \
cannot be found, ask the user to check the spelling.";

/// Reply used when the model returns no text at all
const EMPTY_REPLY: &str = "Sorry, I couldn't come up with a response. Please try again.";

/// Chat front end over the weather tools
#[derive(Debug, Clone)]
pub struct WeatherAssistant {
    client: ClaudeClient,
    tools: WeatherTools,
    definitions: Vec<ToolDefinition>,
    max_tool_rounds: u32,
}

impl WeatherAssistant {
    /// Build the assistant; fails when no API key is configured
    pub fn new(http: reqwest::Client, config: &ChatConfig, weather: WeatherService) -> Result<Self> {
        Ok(Self {
            client: ClaudeClient::new(http, config)?,
            tools: WeatherTools::new(weather),
            definitions: WeatherTools::tool_definitions(),
            max_tool_rounds: config.max_tool_rounds,
        })
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Answer one user message, running tool calls until the model is done
    /// or `max_tool_rounds` is reached.
    #[instrument(skip(self, message), fields(model = %self.client.model()))]
    pub async fn reply(&self, message: &str) -> Result<String> {
        let mut messages = vec![Message::user(message)];
        let mut rounds = 0;

        loop {
            let response = self
                .client
                .send(Some(SYSTEM_PROMPT), &messages, &self.definitions)
                .await?;
            let wants_tools = response.wants_tools();
            let reply = response.into_message();

            let tool_uses = reply.tool_uses();
            if !wants_tools || tool_uses.is_empty() {
                return Ok(final_text(&reply));
            }
            if rounds >= self.max_tool_rounds {
                warn!(rounds, "Tool round limit reached, returning partial reply");
                return Ok(final_text(&reply));
            }
            rounds += 1;

            let mut results: Vec<ContentBlock> = Vec::with_capacity(tool_uses.len());
            for (id, name, input) in tool_uses {
                info!(tool = name, round = rounds, "Running tool");
                results.push(self.tools.call_tool(id, name, input).await);
            }

            messages.push(reply);
            messages.push(Message::tool_results(results));
        }
    }
}

fn final_text(message: &Message) -> String {
    let text = message.text();
    if text.trim().is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        text
    }
}
