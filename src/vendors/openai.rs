//! OpenAI-compatible chat completions, used for OpenAI and Groq.

use super::{check_status, http_client, not_configured, Provider, ProviderError, ProviderSettings};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

pub struct OpenAiCompatible {
    client: reqwest::blocking::Client,
    settings: ProviderSettings,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatible {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: http_client(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

impl Provider for OpenAiCompatible {
    fn name(&self) -> &str {
        self.settings.kind.as_str()
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

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(provider = %self.name(), model = %self.settings.model, "Sending chat completion");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key.expose_secret())
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

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: self.name().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendors::ProviderKind;

    #[test]
    fn test_endpoint() {
        let mut settings = ProviderSettings::new(ProviderKind::Groq);
        assert_eq!(
            OpenAiCompatible::new(settings.clone()).endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );

        settings.base_url = "http://proxy.local/v1/".to_string();
        assert_eq!(
            OpenAiCompatible::new(settings).endpoint(),
            "http://proxy.local/v1/chat/completions"
        );
    }

    #[test]
    fn test_response_parsing() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"hi"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.choices[0].message.content.as_deref(), Some("hi"));
    }

    #[test]
    fn test_empty_key_is_unconfigured() {
        let mut settings = ProviderSettings::new(ProviderKind::OpenAi);
        settings.api_key = Some(String::new().into());
        assert!(!OpenAiCompatible::new(settings).is_configured());
    }
}
