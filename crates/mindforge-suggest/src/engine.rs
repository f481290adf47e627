use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use serde::{Deserialize, Serialize};

use mindforge_core::AiSettings;

use crate::error::RemoteError;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One remote completion. The model id is fixed when the request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

/// The remote generative service as a capability: a network client in
/// production, a scripted stub in tests.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteError>;
}

// --- OpenAI-compatible HTTP endpoint ---

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Talks to any `/chat/completions` endpoint (OpenRouter by default).
pub struct HttpCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpCompletionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteError> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
        };

        let mut builder = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Transport("request timed out".to_string())
            } else {
                RemoteError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status.as_u16(), &text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::MalformedResponse(format!("decode body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .find_map(|c| c.message.and_then(|m| m.content))
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| RemoteError::MalformedResponse("no choice text".to_string()))
    }
}

// --- Native providers through the `llm` crate ---

fn map_backend(provider: &str) -> Option<LLMBackend> {
    match provider {
        "openai" => Some(LLMBackend::OpenAI),
        "anthropic" => Some(LLMBackend::Anthropic),
        "google" => Some(LLMBackend::Google),
        "ollama" => Some(LLMBackend::Ollama),
        "groq" => Some(LLMBackend::Groq),
        "mistral" => Some(LLMBackend::Mistral),
        "deepseek" => Some(LLMBackend::DeepSeek),
        _ => None,
    }
}

pub struct LlmCompletionClient {
    provider: String,
    api_key: String,
    base_url: Option<String>,
}

impl LlmCompletionClient {
    pub fn new(provider: impl Into<String>, api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.into(),
            base_url,
        }
    }
}

#[async_trait]
impl CompletionClient for LlmCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteError> {
        let backend = map_backend(&self.provider)
            .ok_or_else(|| RemoteError::Transport(format!("unknown provider: {}", self.provider)))?;

        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&request.model)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .top_p(request.top_p);

        if !system.is_empty() {
            builder = builder.system(system.join("\n\n"));
        }
        if !self.api_key.is_empty() {
            builder = builder.api_key(&self.api_key);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }

        let llm = builder
            .build()
            .map_err(|e| RemoteError::Transport(format!("build LLM: {e}")))?;

        let messages: Vec<ChatMessage> = request
            .messages
            .iter()
            .filter_map(|m| match m.role {
                Role::System => None,
                Role::User => Some(ChatMessage::user().content(&m.content).build()),
                Role::Assistant => Some(ChatMessage::assistant().content(&m.content).build()),
            })
            .collect();

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| RemoteError::from_message(&format!("chat: {e}")))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(RemoteError::MalformedResponse("LLM returned empty text".to_string())),
            None => Err(RemoteError::MalformedResponse("LLM returned no text".to_string())),
        }
    }
}

/// Build the client the settings describe, or `None` when remote generation
/// is not configured.
pub fn client_from_settings(settings: &AiSettings) -> Option<Arc<dyn CompletionClient>> {
    if !mindforge_core::ai_configured(settings) {
        return None;
    }

    let timeout = Duration::from_secs(settings.timeout_secs());
    match settings.provider.as_str() {
        "openrouter" | "openai-compatible" => {
            let base_url = settings.base_url.clone().or_else(|| {
                (settings.provider == "openrouter").then(|| OPENROUTER_BASE_URL.to_string())
            })?;
            match HttpCompletionClient::new(base_url, &settings.api_key, timeout) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::warn!(error = %e, "could not build HTTP client");
                    None
                }
            }
        }
        provider if map_backend(provider).is_some() => Some(Arc::new(LlmCompletionClient::new(
            provider,
            &settings.api_key,
            settings.base_url.clone(),
        ))),
        other => {
            tracing::warn!(provider = other, "unknown provider, remote generation disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str, key: &str) -> AiSettings {
        AiSettings {
            provider: provider.to_string(),
            api_key: key.to_string(),
            model: "some-model".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn unconfigured_settings_have_no_client() {
        assert!(client_from_settings(&AiSettings::default()).is_none());
        assert!(client_from_settings(&settings("openrouter", "")).is_none());
    }

    #[test]
    fn known_providers_build_clients() {
        assert!(client_from_settings(&settings("openrouter", "k")).is_some());
        assert!(client_from_settings(&settings("anthropic", "k")).is_some());
        assert!(client_from_settings(&settings("ollama", "")).is_some());
    }

    #[test]
    fn unknown_provider_or_missing_base_url_disables_remote() {
        assert!(client_from_settings(&settings("carrier-pigeon", "k")).is_none());
        assert!(client_from_settings(&settings("openai-compatible", "k")).is_none());

        let mut s = settings("openai-compatible", "k");
        s.base_url = Some("http://localhost:8080/v1/".to_string());
        assert!(client_from_settings(&s).is_some());
    }

    #[test]
    fn request_body_uses_openai_field_names() {
        let turns = vec![ChatTurn::system("sys"), ChatTurn::user("hi")];
        let body = ChatCompletionBody {
            model: "m",
            messages: &turns,
            temperature: 0.5,
            max_tokens: 10,
            top_p: 0.9,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 10);
    }
}
