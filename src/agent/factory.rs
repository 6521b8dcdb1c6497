//! Agent factory for creating InferenceAgent trait objects from configuration.

use super::{
    bedrock::{self, BedrockAgent},
    ollama::{self, OllamaAgent},
    openai::{self, OpenAIAgent},
    AgentError, InferenceAgent, RequestOverrides,
};
use crate::config::{BackendConfig, BackendFamily};
use reqwest::Client;
use std::sync::Arc;

/// Create an agent from one backend entry.
///
/// Fails with `AgentError::Configuration` when the model is missing or a
/// required credential or region cannot be resolved from the environment.
///
/// # Examples
///
/// ```
/// use alert_receiver::agent::factory::create_agent;
/// use alert_receiver::config::{BackendConfig, BackendFamily};
/// use reqwest::Client;
/// use std::sync::Arc;
///
/// let config = BackendConfig {
///     name: "local".to_string(),
///     family: BackendFamily::Ollama,
///     model: "llama3:8b".to_string(),
///     ..Default::default()
/// };
/// let agent = create_agent(&config, Arc::new(Client::new())).unwrap();
///
/// assert_eq!(agent.name(), "local");
/// ```
pub fn create_agent(
    config: &BackendConfig,
    client: Arc<Client>,
) -> Result<Arc<dyn InferenceAgent>, AgentError> {
    let name = config.display_name();
    let model = config.model.trim();
    if model.is_empty() {
        return Err(AgentError::Configuration(format!(
            "{} backend \"{}\" is missing model",
            config.family, name
        )));
    }
    let model = model.to_string();

    let overrides = RequestOverrides {
        system_prompt: config.system_prompt.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    match config.family {
        BackendFamily::OpenAI => {
            let api_key = read_env(&config.api_key_env).ok_or_else(|| {
                AgentError::Configuration(format!(
                    "openai backend \"{}\" is missing API key env \"{}\"",
                    name, config.api_key_env
                ))
            })?;
            let base_url = non_empty_or(&config.base_url, openai::DEFAULT_BASE_URL);

            Ok(Arc::new(OpenAIAgent::new(
                name, model, base_url, api_key, overrides, client,
            )))
        }
        BackendFamily::Ollama => {
            let base_url = non_empty_or(&config.base_url, ollama::DEFAULT_BASE_URL);
            Ok(Arc::new(OllamaAgent::new(
                name, model, base_url, overrides, client,
            )))
        }
        BackendFamily::Bedrock => {
            let region = Some(config.region.trim().to_string())
                .filter(|r| !r.is_empty())
                .or_else(|| read_env("AWS_REGION"))
                .ok_or_else(|| {
                    AgentError::Configuration(format!(
                        "bedrock backend \"{}\" is missing region",
                        name
                    ))
                })?;

            let token_env = non_empty_or(&config.api_key_env, bedrock::DEFAULT_TOKEN_ENV);
            let token = read_env(&token_env).ok_or_else(|| {
                AgentError::Configuration(format!(
                    "bedrock backend \"{}\" is missing bearer token env \"{}\"",
                    name, token_env
                ))
            })?;
            let endpoint = non_empty_or(&config.base_url, &bedrock::default_endpoint(&region));

            Ok(Arc::new(BedrockAgent::new(
                name, model, region, endpoint, token, overrides, client,
            )))
        }
    }
}

/// Create every configured agent, preserving configuration order. The first
/// failure aborts.
pub fn create_agents(
    configs: &[BackendConfig],
    client: Arc<Client>,
) -> Result<Vec<Arc<dyn InferenceAgent>>, AgentError> {
    configs
        .iter()
        .map(|config| create_agent(config, client.clone()))
        .collect()
}

fn read_env(var: &str) -> Option<String> {
    if var.trim().is_empty() {
        return None;
    }
    std::env::var(var.trim())
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.trim().to_string()
    }
}
