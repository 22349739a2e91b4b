use super::LLMBackend;
use crate::agent::Message;
use crate::error::{RcaError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::runtime::Runtime;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI Chat Completions backend.
pub struct OpenAiBackend {
    runtime: Runtime,
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RcaError::MissingApiKey("OPENAI_API_KEY".to_string()));
        }
        let runtime = Runtime::new().map_err(RcaError::Io)?;

        Ok(Self {
            runtime,
            client: Client::new(),
            api_key,
            model: model.into(),
        })
    }
}

impl LLMBackend for OpenAiBackend {
    fn generate(&mut self, messages: &[Message]) -> Result<String> {
        // system/user/assistant 역할을 그대로 전달
        let request_body = json!({
            "model": self.model,
            "messages": messages,
        });

        tracing::debug!(model = %self.model, turns = messages.len(), "openai request");

        let api_response = self.runtime.block_on(async {
            let response = self
                .client
                .post(OPENAI_API_URL)
                .bearer_auth(&self.api_key)
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

            Ok::<ChatResponse, RcaError>(response.json().await?)
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RcaError::Provider("No choices in response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_content_is_read() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Root cause service: ts-food-service"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Root cause service: ts-food-service")
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            OpenAiBackend::new("", DEFAULT_MODEL),
            Err(RcaError::MissingApiKey(_))
        ));
    }
}
