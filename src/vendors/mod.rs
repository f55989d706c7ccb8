//! Text-generation vendors.
//!
//! Each vendor turns a prompt into generated text over its HTTP API. Calls
//! are blocking, one request at a time, with no retries.

pub mod anthropic;
pub mod ollama;
pub mod openai;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Request timeout for generation calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} is not configured: {hint}")]
    NotConfigured { provider: String, hint: String },

    #[error("request to {provider} failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },
}

/// A text-generation backend.
pub trait Provider {
    fn name(&self) -> &str;

    /// True when the provider has what it needs to make a request.
    fn is_configured(&self) -> bool;

    fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Groq,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Groq,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "llama-3.3-70b-versatile",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderKind::Ollama => "llama3.2",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable holding the API key, if the vendor needs one
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Groq => Some("GROQ_API_KEY"),
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => anyhow::bail!(
                "invalid provider: {} (valid: groq, openai, anthropic, ollama)",
                other
            ),
        }
    }
}

/// Fully resolved settings for one vendor.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<SecretString>,
}

impl ProviderSettings {
    /// Defaults with no credentials.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: kind.default_model().to_string(),
            base_url: kind.default_base_url().to_string(),
            api_key: None,
        }
    }
}

/// Build the client for a vendor.
pub fn build_provider(settings: ProviderSettings) -> Box<dyn Provider> {
    tracing::debug!(provider = %settings.kind, model = %settings.model, "Building provider");
    match settings.kind {
        ProviderKind::Groq | ProviderKind::OpenAi => {
            Box::new(openai::OpenAiCompatible::new(settings))
        }
        ProviderKind::Anthropic => Box::new(anthropic::AnthropicClient::new(settings)),
        ProviderKind::Ollama => Box::new(ollama::OllamaClient::new(settings)),
    }
}

pub(crate) fn http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::blocking::Client::new())
}

/// Turn a non-success response into an API error with the body as message.
pub(crate) fn check_status(
    provider: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProviderError::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        message,
    })
}

pub(crate) fn not_configured(kind: ProviderKind) -> ProviderError {
    let hint = match kind.api_key_env() {
        Some(env) => format!(
            "set {} or run 'skillforge config set {}-api-key <key>'",
            env, kind
        ),
        None => "check the endpoint with 'skillforge config get ollama-endpoint'".to_string(),
    };
    ProviderError::NotConfigured {
        provider: kind.to_string(),
        hint,
    }
}
