use async_trait::async_trait;
use reqwest::Client;

use super::models::*;
use crate::models::Message;
use crate::providers::traits::CompletionClient;
use crate::providers::types::*;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct ClaudeProvider {
    client: Client,
    base_url: String,
}

impl ClaudeProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url.trim_end_matches('/'))
    }

    fn parse_error_message(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ClaudeErrorResponse>(body) {
            return parsed.error.message;
        }
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    }

    fn build_messages(messages: &[Message]) -> Vec<ClaudeMessage> {
        messages
            .iter()
            .map(|msg| ClaudeMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect()
    }

    /// The reply is the text of the first content block.
    fn parse_reply(body: &str, requested_model: &str) -> Result<CompletionResponse, ProviderError> {
        let claude_response: ClaudeResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let content = match claude_response.content.into_iter().next() {
            Some(ClaudeResponseBlock::Text { text }) => text,
            Some(ClaudeResponseBlock::Other) => {
                return Err(ProviderError::InvalidResponse(
                    "First content block carries no text".to_string(),
                ))
            }
            None => {
                return Err(ProviderError::InvalidResponse(
                    "No content in response".to_string(),
                ))
            }
        };

        let (tokens_in, tokens_out) = claude_response
            .usage
            .map(|u| (u.input_tokens, u.output_tokens))
            .unwrap_or((None, None));

        Ok(CompletionResponse {
            content,
            model: claude_response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
            tokens_in,
            tokens_out,
        })
    }
}

impl Default for ClaudeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for ClaudeProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let claude_request = ClaudeRequest {
            model: request.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: Self::build_messages(&request.messages),
        };

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &request.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&claude_request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status_code: status.as_u16(),
                message: Self::parse_error_message(status, &body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Self::parse_reply(&body, &request.model)
    }
}
