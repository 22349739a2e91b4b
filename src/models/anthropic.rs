use super::LLMBackend;
use crate::agent::Message;
use crate::error::{RcaError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::runtime::Runtime;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    runtime: Runtime,
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RcaError::MissingApiKey("ANTHROPIC_API_KEY".to_string()));
        }
        let runtime = Runtime::new().map_err(RcaError::Io)?;

        Ok(Self {
            runtime,
            client: Client::new(),
            api_key,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// System text goes in its own field; the rest stays as chat turns.
fn split_system(messages: &[Message]) -> (String, Vec<serde_json::Value>) {
    let system = messages
        .iter()
        .filter(|m| m.role == "system")
        .map(|m| m.content.as_str())
        .collect::<Vec<&str>>()
        .join("\n\n");

    let turns = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();

    (system, turns)
}

impl LLMBackend for AnthropicBackend {
    fn generate(&mut self, messages: &[Message]) -> Result<String> {
        let (system, turns) = split_system(messages);
        let request_body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": turns,
        });

        tracing::debug!(model = %self.model, turns = messages.len(), "anthropic request");

        let api_response = self.runtime.block_on(async {
            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(RcaError::Provider(format!(
                    "API request failed with status {status}: {error_text}"
                )));
            }

            Ok::<AnthropicResponse, RcaError>(response.json().await?)
        })?;

        if let Some(usage) = &api_response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "anthropic usage"
            );
        }

        let text = api_response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<&str>>()
            .join("");

        if text.is_empty() {
            return Err(RcaError::Provider("No text content in response".to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}
