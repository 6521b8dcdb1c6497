//! OpenAI agent implementation.

use super::{read_success_body, AgentError, InferenceAgent, InferenceRequest, RequestOverrides};
use crate::config::BackendFamily;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI agent implementation.
///
/// Chat completion via `POST {base_url}/chat/completions` with Bearer token.
/// Works against any server exposing the same endpoint shape.
pub struct OpenAIAgent {
    name: String,
    model: String,
    /// Base URL including the API version segment (e.g., "https://api.openai.com/v1")
    base_url: String,
    /// API key for Bearer authentication
    api_key: String,
    overrides: RequestOverrides,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl OpenAIAgent {
    pub fn new(
        name: String,
        model: String,
        base_url: String,
        api_key: String,
        overrides: RequestOverrides,
        client: Arc<Client>,
    ) -> Self {
        Self {
            name,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            overrides,
            client,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl InferenceAgent for OpenAIAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> BackendFamily {
        BackendFamily::OpenAI
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
        let url = format!("{}/chat/completions", self.base_url);
        let deadline_ms = deadline.as_millis() as u64;

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| AgentError::from_reqwest(e, deadline_ms))?;

        let body = read_success_body(response, deadline_ms).await?;

        let completion: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::InvalidResponse("openai returned no choices".to_string()))?;

        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn test_agent(base_url: String, api_key: &str) -> OpenAIAgent {
        OpenAIAgent::new(
            "openai-primary".to_string(),
            "gpt-4o-mini".to_string(),
            base_url,
            api_key.to_string(),
            RequestOverrides::default(),
            Arc::new(Client::new()),
        )
    }

    fn request() -> InferenceRequest {
        InferenceRequest {
            system_prompt: "sys".to_string(),
            user_prompt: "analyze".to_string(),
            max_tokens: 900,
            temperature: 0.2,
        }
    }

    #[tokio::test]
    async fn test_complete_with_bearer_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test123")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "analyze"}
                ],
                "max_tokens": 900,
                "temperature": 0.2
            })))
            .with_status(200)
            .with_body(r#"{"id":"cmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"  {\"summary\":\"x\"}\n"}}]}"#)
            .create_async()
            .await;

        let agent = test_agent(server.url(), "sk-test123");
        let text = agent
            .complete(&request(), Duration::from_secs(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, r#"{"summary":"x"}"#);
    }

    #[tokio::test]
    async fn test_error_status_carries_trimmed_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("invalid api key\n")
            .create_async()
            .await;

        let agent = test_agent(server.url(), "bad");
        let err = agent
            .complete(&request(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(
            matches!(err, AgentError::Upstream { status: 401, ref message } if message == "invalid api key")
        );
    }

    #[tokio::test]
    async fn test_no_choices_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let agent = test_agent(server.url(), "sk");
        let err = agent
            .complete(&request(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(ref m) if m.contains("no choices")));
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let agent = test_agent(server.url(), "sk");
        let err = agent
            .complete(&request(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_identity() {
        let agent = test_agent(format!("{}/", DEFAULT_BASE_URL), "sk");
        let id = agent.identity();
        assert_eq!(id.name, "openai-primary");
        assert_eq!(id.family, BackendFamily::OpenAI);
        assert_eq!(id.model, "gpt-4o-mini");
        assert_eq!(agent.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_network_error() {
        let agent = test_agent("http://127.0.0.1:1".to_string(), "sk");
        let result = agent.complete(&request(), Duration::from_secs(2)).await;
        assert!(matches!(
            result,
            Err(AgentError::Network(_)) | Err(AgentError::Timeout(_))
        ));
    }
}
