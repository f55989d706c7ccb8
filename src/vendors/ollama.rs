//! Local Ollama chat API.

use super::{check_status, http_client, Provider, ProviderError, ProviderSettings};
use serde::{Deserialize, Serialize};

pub struct OllamaClient {
    client: reqwest::blocking::Client,
    settings: ProviderSettings,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaClient {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: http_client(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.settings.base_url.trim_end_matches('/'))
    }
}

impl Provider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    /// Ollama runs locally without credentials.
    fn is_configured(&self) -> bool {
        !self.settings.base_url.is_empty()
    }

    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        tracing::debug!(endpoint = %self.endpoint(), model = %self.settings.model, "Sending Ollama chat");
        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .map_err(|source| ProviderError::Http {
                provider: self.name().to_string(),
                source,
            })?;

        let body: ChatResponse = check_status(self.name(), response)?
            .json()
            .map_err(|source| ProviderError::Http {
                provider: self.name().to_string(),
                source,
            })?;

        body.message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: self.name().to_string(),
            })
    }
}
