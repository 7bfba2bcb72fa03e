use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use tracing::{debug, warn};

use super::gateway::types::{ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse};
use super::gateway::{CompletionError, CompletionGateway, CompletionParams, GatewayMetadata};
use crate::message::Message;

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiService {
    client: Client,
    api_key: Secret<String>,
    base_url: String,
}

impl OpenAiService {
    pub fn new(api_key: Secret<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Prefer the `error.message` of an OpenAI error body, else the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl CompletionGateway for OpenAiService {
    fn metadata(&self) -> GatewayMetadata {
        GatewayMetadata {
            name: "OpenAI".to_string(),
            base_url: self.base_url.clone(),
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, CompletionError> {
        debug!(
            "Sending {} messages to {} using {}",
            messages.len(),
            self.base_url,
            params.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&ChatCompletionRequest {
                model: &params.model,
                messages,
                temperature: params.temperature,
                top_p: params.top_p,
                max_tokens: params.max_tokens,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!("Completion API error ({}): {}", status, body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}
