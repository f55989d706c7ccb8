//! Anthropic messages API.

use super::{check_status, http_client, not_configured, Provider, ProviderError, ProviderSettings};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicClient {
    client: reqwest::blocking::Client,
    settings: ProviderSettings,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: http_client(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.settings.base_url.trim_end_matches('/'))
    }
}

impl Provider for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn is_configured(&self) -> bool {
        self.settings
            .api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = match &self.settings.api_key {
            Some(key) if !key.expose_secret().is_empty() => key,
            _ => return Err(not_configured(self.settings.kind)),
        };

        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.settings.model, "Sending Anthropic message");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .map_err(|source| ProviderError::Http {
                provider: self.name().to_string(),
                source,
            })?;

        let body: MessagesResponse = check_status(self.name(), response)?
            .json()
            .map_err(|source| ProviderError::Http {
                provider: self.name().to_string(),
                source,
            })?;

        collect_text(body).ok_or_else(|| ProviderError::EmptyResponse {
            provider: self.name().to_string(),
        })
    }
}

/// Concatenate the text blocks of a response.
fn collect_text(body: MessagesResponse) -> Option<String> {
    let text: String = body
        .content
        .into_iter()
        .filter(|b| b.kind == "text")
        .map(|b| b.text)
        .collect();
    (!text.trim().is_empty()).then_some(text)
}
