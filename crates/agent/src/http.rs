//! HTTP client for OpenAI-compatible chat-completions endpoints. Vertex AI
//! publishes one per region, so the same wire shape covers every supported
//! provider; only the endpoint URL and auth differ.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use datachat_core::config::{LlmConfig, LlmProvider};

use crate::llm::{ChatMessage, LlmClient, LlmError};

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
}

impl HttpLlmClient {
    /// Build a client for the configured provider. `project` is the cloud
    /// project the Vertex endpoint is scoped to; other providers ignore it.
    pub fn new(llm: &LlmConfig, project: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs.max(1)))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: resolve_endpoint(llm, project),
            api_key: llm.api_key.clone(),
            model: llm.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn resolve_endpoint(llm: &LlmConfig, project: &str) -> String {
    if let Some(base_url) = &llm.base_url {
        let trimmed = base_url.trim_end_matches('/');
        // An explicit base_url is the OpenAI-compatible API root.
        return match llm.provider {
            LlmProvider::Vertex | LlmProvider::OpenAi => format!("{trimmed}/chat/completions"),
            LlmProvider::Ollama => format!("{trimmed}/v1/chat/completions"),
        };
    }

    match llm.provider {
        LlmProvider::Vertex => format!(
            "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/endpoints/openapi/chat/completions",
            location = llm.location
        ),
        LlmProvider::OpenAi => format!("{OPENAI_DEFAULT_BASE_URL}/chat/completions"),
        // validated at config load; unreachable without a base_url
        LlmProvider::Ollama => "http://localhost:11434/v1/chat/completions".to_string(),
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: self.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), detail });
        }

        let completion: CompletionResponse =
            response.json().await.map_err(|error| LlmError::Decode(error.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self { role: message.role.as_str(), content: message.content.clone() }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use datachat_core::config::{LlmConfig, LlmProvider};

    use super::resolve_endpoint;

    fn llm_config(provider: LlmProvider, base_url: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            model: "gemini-2.0-flash-lite-001".to_string(),
            location: "us-east1".to_string(),
            api_key: None,
            base_url: base_url.map(str::to_string),
            timeout_secs: 60,
        }
    }

    #[test]
    fn vertex_endpoint_is_scoped_to_project_and_location() {
        let endpoint = resolve_endpoint(&llm_config(LlmProvider::Vertex, None), "acme-analytics");
        assert_eq!(
            endpoint,
            "https://us-east1-aiplatform.googleapis.com/v1/projects/acme-analytics/locations/us-east1/endpoints/openapi/chat/completions"
        );
    }

    #[test]
    fn explicit_base_url_wins_over_provider_default() {
        let endpoint = resolve_endpoint(
            &llm_config(LlmProvider::OpenAi, Some("https://llm.internal/v1/")),
            "ignored",
        );
        assert_eq!(endpoint, "https://llm.internal/v1/chat/completions");
    }

    #[test]
    fn ollama_uses_its_openai_compatible_path() {
        let endpoint = resolve_endpoint(
            &llm_config(LlmProvider::Ollama, Some("http://localhost:11434")),
            "ignored",
        );
        assert_eq!(endpoint, "http://localhost:11434/v1/chat/completions");
    }
}
