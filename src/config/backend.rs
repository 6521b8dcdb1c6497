//! Inference backend configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inference backend family. Selects the adapter implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BackendFamily {
    #[default]
    OpenAI,
    Ollama,
    Bedrock,
}

impl BackendFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendFamily::OpenAI => "openai",
            BackendFamily::Ollama => "ollama",
            BackendFamily::Bedrock => "bedrock",
        }
    }
}

impl fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; an empty value means `openai`.
impl TryFrom<String> for BackendFamily {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "" | "openai" => Ok(BackendFamily::OpenAI),
            "ollama" => Ok(BackendFamily::Ollama),
            "bedrock" => Ok(BackendFamily::Bedrock),
            other => Err(format!("unsupported backend type \"{}\"", other)),
        }
    }
}

/// One entry of the ordered backend list.
///
/// Zero or empty override fields inherit the prompt builder's values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub family: BackendFamily,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    /// Name of the environment variable holding the credential.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub temperature: f64,
}

impl BackendConfig {
    /// Display name, falling back to the family name.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            self.family.to_string()
        } else {
            self.name.clone()
        }
    }
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_zero_f64(v: &f64) -> bool {
    *v == 0.0
}
