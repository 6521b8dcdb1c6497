//! Ollama agent implementation.

use super::{read_success_body, AgentError, InferenceAgent, InferenceRequest, RequestOverrides};
use crate::config::BackendFamily;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://ollama:11434";

/// Ollama agent implementation.
///
/// Non-streaming chat via `POST /api/chat`. No credential.
pub struct OllamaAgent {
    name: String,
    model: String,
    /// Base URL (e.g., "http://localhost:11434")
    base_url: String,
    overrides: RequestOverrides,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl OllamaAgent {
    pub fn new(
        name: String,
        model: String,
        base_url: String,
        overrides: RequestOverrides,
        client: Arc<Client>,
    ) -> Self {
        Self {
            name,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            overrides,
            client,
        }
    }
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: [OllamaMessage<'a>; 2],
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: OllamaResponseMessage,
}

#[derive(Deserialize, Default)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl InferenceAgent for OllamaAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> BackendFamily {
        BackendFamily::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn overrides(&self) -> Option<&RequestOverrides> {
        Some(&self.overrides)
    }

    async fn complete(
        &self,
        request: &InferenceRequest,
        deadline: Duration,
    ) -> Result<String, AgentError> {
        let url = format!("{}/api/chat", self.base_url);
        let deadline_ms = deadline.as_millis() as u64;

        let body = OllamaChatRequest {
            model: &self.model,
            stream: false,
            messages: [
                OllamaMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                OllamaMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| AgentError::from_reqwest(e, deadline_ms))?;

        let body = read_success_body(response, deadline_ms).await?;

        let chat: OllamaChatResponse = serde_json::from_str(&body).map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse Ollama chat response: {}", e))
        })?;

        Ok(chat.message.content.trim().to_string())
    }
}
