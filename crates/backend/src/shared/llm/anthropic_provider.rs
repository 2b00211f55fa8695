use super::types::{ChatMessage, ChatRole, LlmError, LlmProvider, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API провайдер
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    model: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: i32,
    output_tokens: i32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AnthropicProvider {
    /// Создать провайдер для api.anthropic.com
    pub fn new(
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        Self::new_with_endpoint(
            DEFAULT_API_BASE.to_string(),
            api_key,
            model,
            max_tokens,
            timeout_secs,
        )
    }

    /// Создать с кастомным endpoint (прокси, тестовый сервер)
    pub fn new_with_endpoint(
        api_base: String,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
            max_tokens,
            timeout_secs,
        })
    }

    /// System-сообщения уходят в отдельное поле `system`
    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> MessagesRequest<'a> {
        let mut system_parts = Vec::new();
        let mut request_messages = Vec::new();

        for msg in messages {
            match msg.role {
                ChatRole::System => system_parts.push(msg.content.as_str()),
                ChatRole::User => request_messages.push(RequestMessage {
                    role: "user",
                    content: &msg.content,
                }),
                ChatRole::Assistant => request_messages.push(RequestMessage {
                    role: "assistant",
                    content: &msg.content,
                }),
            }
        }

        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            messages: request_messages,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::NetworkError(e.to_string())
        }
    }

    fn map_status_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|env| env.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status.as_u16() {
            401 | 403 => LlmError::AuthError(message),
            429 => LlmError::RateLimitExceeded,
            400 | 404 | 413 | 422 => LlmError::InvalidRequest(format!("{}: {}", status, message)),
            _ => LlmError::ApiError(format!("{}: {}", status, message)),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<LlmResponse, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::AuthError("API key is not configured".to_string()))?;

        let url = format!("{}/v1/messages", self.api_base);
        let request = self.build_request(&messages);

        tracing::debug!(
            "Anthropic request: model={}, max_tokens={}, messages={}",
            request.model,
            request.max_tokens,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            tracing::error!("Anthropic API request failed with status {}", status);
            return Err(Self::map_status_error(status, &body));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::ApiError(format!("Unexpected response format: {}", e)))?;

        let content = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| LlmError::ApiError("No text content in response".to_string()))?;

        Ok(LlmResponse {
            content,
            tokens_used: parsed.usage.map(|u| u.input_tokens + u.output_tokens),
            model: parsed.model,
            finish_reason: parsed.stop_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}
