//! Raw HTTP client for OpenAI-compatible chat-completion endpoints.
//!
//! No workflow awareness — just makes API calls via reqwest.

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use super::types::{ChatRequest, ChatResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors from LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error")]
    Network(#[from] reqwest::Error),

    #[error("authentication rejected (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Raw HTTP client for `POST {base_url}/chat/completions`.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client with the default base URL.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.into())
    }

    /// Create a client with a custom base URL (proxies, compatible providers, tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the authenticated request without sending it.
    pub fn request(&self, body: &ChatRequest) -> RequestBuilder {
        let url = format!("{}/chat/completions", self.base_url);
        self.http
            .post(url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(body)
    }

    /// Send a chat-completion request.
    pub async fn chat_completions(&self, body: &ChatRequest) -> Result<ChatResponse, LlmError> {
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            max_tokens = body.max_tokens,
            "chat completion request"
        );

        let response = self.request(body).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(LlmError::RateLimited { retry_after });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(LlmError::Unauthorized {
                status: status.as_u16(),
                message: body,
            });
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let resp: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if let Some(usage) = &resp.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }

        Ok(resp)
    }
}
