//! Amazon Bedrock agent implementation.
//!
//! Invokes Anthropic models through the Bedrock runtime `InvokeModel` HTTP
//! API with a Bedrock API key (Bearer token). The request uses the Anthropic
//! Messages envelope: the system prompt is a top-level field separate from
//! the message list.

use super::{read_success_body, AgentError, InferenceAgent, InferenceRequest, RequestOverrides};
use crate::config::BackendFamily;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const DEFAULT_TOKEN_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Regional runtime endpoint.
pub fn default_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region)
}

pub struct BedrockAgent {
    name: String,
    model: String,
    region: String,
    /// Runtime endpoint without trailing slash
    endpoint: String,
    token: String,
    overrides: RequestOverrides,
    client: Arc<Client>,
}

impl BedrockAgent {
    pub fn new(
        name: String,
        model: String,
        region: String,
        endpoint: String,
        token: String,
        overrides: RequestOverrides,
        client: Arc<Client>,
    ) -> Self {
        Self {
            name,
            model,
            region,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            overrides,
            client,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[derive(Serialize)]
struct BedrockMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    messages: [BedrockMessage<'a>; 1],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

impl<'a> InvokeRequest<'a> {
    fn from_request(request: &'a InferenceRequest) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            messages: [BedrockMessage {
                role: "user",
                content: &request.user_prompt,
            }],
            max_tokens: request.max_tokens,
            system: Some(request.system_prompt.as_str()).filter(|s| !s.is_empty()),
            temperature: Some(request.temperature).filter(|t| *t > 0.0),
        }
    }
}

#[derive(Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Unwrap the Messages response into plain text.
///
/// Text blocks are joined with newlines in order. A body that does not decode
/// or carries no text is returned verbatim (trimmed) instead of failing.
pub(crate) fn unwrap_response(body: &str) -> String {
    let parts: Vec<String> = serde_json::from_str::<InvokeResponse>(body)
        .map(|r| {
            r.content
                .into_iter()
                .map(|block| block.text)
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        body.trim().to_string()
    } else {
        parts.join("\n").trim().to_string()
    }
}

#[async_trait]
impl InferenceAgent for BedrockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> BackendFamily {
        BackendFamily::Bedrock
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
        let url = format!("{}/model/{}/invoke", self.endpoint, self.model);
        let deadline_ms = deadline.as_millis() as u64;

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.token))
            .header("accept", "application/json")
            .json(&InvokeRequest::from_request(request))
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| AgentError::from_reqwest(e, deadline_ms))?;

        let body = read_success_body(response, deadline_ms).await?;
        Ok(unwrap_response(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn test_agent(endpoint: String) -> BedrockAgent {
        BedrockAgent::new(
            "claude".to_string(),
            "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
            "us-east-1".to_string(),
            endpoint,
            "bedrock-token".to_string(),
            RequestOverrides::default(),
            Arc::new(Client::new()),
        )
    }

    fn request(system: &str, temperature: f64) -> InferenceRequest {
        InferenceRequest {
            system_prompt: system.to_string(),
            user_prompt: "analyze".to_string(),
            max_tokens: 900,
            temperature,
        }
    }

    #[test]
    fn test_envelope_omits_empty_system_and_zero_temperature() {
        let req = request("", 0.0);
        let json = serde_json::to_value(InvokeRequest::from_request(&req)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "anthropic_version": "bedrock-2023-05-31",
                "messages": [{"role": "user", "content": "analyze"}],
                "max_tokens": 900
            })
        );
    }

    #[test]
    fn test_envelope_carries_system_separately() {
        let req = request("sys", 0.2);
        let json = serde_json::to_value(InvokeRequest::from_request(&req)).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["temperature"], 0.2);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_unwrap_joins_text_blocks() {
        let body = r#"{"content":[{"type":"text","text":"first"},{"type":"tool_use","id":"x"},{"type":"text","text":"second"}]}"#;
        assert_eq!(unwrap_response(body), "first\nsecond");
    }

    #[test]
    fn test_unwrap_falls_back_to_raw_body() {
        assert_eq!(unwrap_response("  plain text answer \n"), "plain text answer");
        assert_eq!(unwrap_response(r#"{"content":[]}"#), r#"{"content":[]}"#);
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(
            default_endpoint("eu-west-1"),
            "https://bedrock-runtime.eu-west-1.amazonaws.com"
        );
    }

    #[tokio::test]
    async fn test_invoke_model() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                Matcher::Regex(r"^/model/anthropic\.claude-3-haiku-20240307-v1(:|%3A)0/invoke$".to_string()),
            )
            .match_header("authorization", "Bearer bedrock-token")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "anthropic_version": "bedrock-2023-05-31",
                "system": "sys"
            })))
            .with_status(200)
            .with_body(r#"{"id":"msg_1","type":"message","role":"assistant","content":[{"type":"text","text":"{\"summary\":\"wan down\"}"}],"stop_reason":"end_turn"}"#)
            .create_async()
            .await;

        let agent = test_agent(server.url());
        let text = agent
            .complete(&request("sys", 0.2), Duration::from_secs(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, r#"{"summary":"wan down"}"#);
    }

    #[tokio::test]
    async fn test_throttled() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(429)
            .with_body(r#"{"message":"Too many requests"}"#)
            .create_async()
            .await;

        let agent = test_agent(server.url());
        let err = agent
            .complete(&request("sys", 0.2), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Upstream { status: 429, .. }));
    }
}
