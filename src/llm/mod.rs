//! Chat client — the one seam to the language model.
//!
//! `ChatCompletion` is the contract the workflow talks to. `ChatClient` is
//! the production implementation: it wraps `OpenAiClient` with default
//! generation options that per-call overrides merge over.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::debug;

use client::{LlmError, OpenAiClient};
use types::{ChatRequest, GenerationOptions, Message, OptionsOverride};

/// Send role-tagged messages, receive the first completion's text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Returns `""` when the provider produced no content.
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: &OptionsOverride,
    ) -> Result<String, LlmError>;

    /// Assemble `[system] + history + [user]` and complete it.
    async fn chat(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[Message],
        options: &OptionsOverride,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(user_message));
        self.complete(messages, options).await
    }
}

/// Production chat client with default generation options.
#[derive(Debug)]
pub struct ChatClient {
    client: OpenAiClient,
    defaults: GenerationOptions,
}

impl ChatClient {
    /// Create a client with a custom base URL.
    pub fn with_base_url(api_key: String, base_url: String, defaults: GenerationOptions) -> Self {
        Self {
            client: OpenAiClient::with_base_url(api_key, base_url),
            defaults,
        }
    }

    pub fn defaults(&self) -> &GenerationOptions {
        &self.defaults
    }

    pub fn raw(&self) -> &OpenAiClient {
        &self.client
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: &OptionsOverride,
    ) -> Result<String, LlmError> {
        let resolved = self.defaults.merged(options);
        let request = ChatRequest::new(messages, &resolved);
        let response = self.client.chat_completions(&request).await?;
        debug!(
            model = response.model.as_deref().unwrap_or(&resolved.model),
            chars = response.text().len(),
            "completion received"
        );
        Ok(response.text().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use types::Role;

    /// Records the messages it was asked to complete.
    struct Recorder {
        seen: Mutex<Vec<Vec<Message>>>,
    }

    #[async_trait]
    impl ChatCompletion for Recorder {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _options: &OptionsOverride,
        ) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(messages);
            Ok("ok".into())
        }
    }

    #[tokio::test]
    async fn chat_wraps_history_between_system_and_user() {
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let history = vec![Message::user("frage"), Message::assistant("antwort")];

        let text = recorder
            .chat("system", "neu", &history, &OptionsOverride::default())
            .await
            .unwrap();
        assert_eq!(text, "ok");

        let seen = recorder.seen.lock().unwrap();
        let roles: Vec<Role> = seen[0].iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(seen[0][0].content, "system");
        assert_eq!(seen[0][3].content, "neu");
    }

    #[test]
    fn client_keeps_defaults() {
        let defaults = GenerationOptions {
            model: "gpt-4o-mini".into(),
            ..GenerationOptions::default()
        };
        let client = ChatClient::with_base_url("k".into(), "http://localhost:1".into(), defaults);
        assert_eq!(client.defaults().model, "gpt-4o-mini");
        assert_eq!(client.raw().base_url(), "http://localhost:1");
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_error() {
        let client = ChatClient::with_base_url(
            "k".into(),
            "http://127.0.0.1:1".into(),
            GenerationOptions::default(),
        );
        let result = client
            .complete(vec![Message::user("hi")], &OptionsOverride::default())
            .await;
        assert!(result.is_err());
    }
}
