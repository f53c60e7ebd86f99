//! Generation provider adapter.
//!
//! Classifies an API key into one of two supported providers by key format
//! alone, probes a priority-ordered model list until one answers, and reuses
//! that working model for every later generation call. Both providers speak
//! the OpenAI-compatible chat-completions dialect, so one wire format covers
//! them.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The two supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Groq,
}

impl Provider {
    /// Classify an API key by prefix. Purely format-based — no network call.
    pub fn detect(api_key: &str) -> Option<Self> {
        if api_key.starts_with("gsk_") {
            Some(Self::Groq)
        } else if api_key.starts_with("sk-") {
            Some(Self::OpenAi)
        } else {
            None
        }
    }

    /// Candidate models in probe priority order.
    pub fn candidate_models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["gpt-4o-mini", "gpt-4o", "gpt-3.5-turbo"],
            Self::Groq => &[
                "llama-3.3-70b-versatile",
                "llama-3.1-8b-instant",
                "gemma2-9b-it",
            ],
        }
    }

    /// Fallback model when no working model was ever recorded.
    pub fn default_model(&self) -> &'static str {
        self.candidate_models()[0]
    }

    /// Chat completions endpoint. Groq exposes an OpenAI-compatible API.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::Groq => "https://api.groq.com/openai/v1/chat/completions",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Groq => "Groq",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the generation adapter, split along the classes callers
/// need to distinguish: configuration faults, exhausted model lists, and
/// individual request failures.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingKey,
    #[error("unrecognized API key format; expected an OpenAI (sk-...) or Groq (gsk_...) key")]
    UnknownProvider,
    #[error("all {provider} models failed; last error: {last}")]
    AllModelsFailed { provider: Provider, last: String },
    #[error("generation request failed: {0}")]
    Request(String),
}

/// One chat-completion call.
#[derive(Debug, Clone)]
pub struct ChatCall<'a> {
    pub provider: Provider,
    pub api_key: &'a str,
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
}

/// Backend issuing chat-completion requests. Object-safe so tests can inject
/// a scripted fake in place of the HTTP client.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, call: ChatCall<'_>) -> Result<String>;
}

// ── OpenAI-compatible wire format ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Production [`ChatBackend`] over reqwest.
pub struct HttpChatBackend {
    client: reqwest::Client,
    max_tokens: u32,
}

impl HttpChatBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_tokens: 1024,
        }
    }
}

impl Default for HttpChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn complete(&self, call: ChatCall<'_>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: call.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: call.system,
                },
                ChatMessage {
                    role: "user",
                    content: call.user,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(call.provider.endpoint())
            .bearer_auth(call.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned HTTP {status}: {body}", call.provider);
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("{} returned no choices", call.provider))?;

        Ok(reply)
    }
}

// ── Client state machine ──────────────────────────────────────────────────────

/// Connection state: detection happens at construction, verification on the
/// first successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectionState {
    Detected,
    Verified { working_model: String },
    Failed,
}

/// Generation client holding the detected provider and the remembered
/// working model.
pub struct GenerationClient {
    api_key: String,
    provider: Option<Provider>,
    state: ConnectionState,
    backend: Box<dyn ChatBackend>,
}

impl GenerationClient {
    /// Detect the provider from the key format. An empty key is a fatal
    /// configuration error; an unrecognized format is deferred until the
    /// first call that actually needs a provider.
    pub fn new(
        api_key: impl Into<String>,
        backend: Box<dyn ChatBackend>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingKey);
        }
        let provider = Provider::detect(&api_key);
        if let Some(provider) = provider {
            debug!(%provider, "provider detected from key format");
        }
        Ok(Self {
            api_key,
            provider,
            state: ConnectionState::Detected,
            backend,
        })
    }

    /// The detected provider, if the key matched a known format.
    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }

    /// The model recorded by the last successful probe, if any.
    pub fn working_model(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Verified { working_model } => Some(working_model),
            _ => None,
        }
    }

    /// Probe the provider's candidate models in priority order, recording
    /// the first one that answers. Returns `true` on success; raises a
    /// provider-named error once every candidate has failed.
    pub async fn test_connection(&mut self) -> Result<bool, ProviderError> {
        let provider = self.provider.ok_or(ProviderError::UnknownProvider)?;

        let mut last_error = String::from("no models attempted");
        for model in provider.candidate_models() {
            debug!(%provider, model, "probing model");
            let call = ChatCall {
                provider,
                api_key: &self.api_key,
                model,
                system: "You are a connectivity check.",
                user: "Reply with OK.",
            };
            match self.backend.complete(call).await {
                Ok(_) => {
                    info!(%provider, model, "connection verified");
                    self.state = ConnectionState::Verified {
                        working_model: model.to_string(),
                    };
                    return Ok(true);
                }
                Err(err) => {
                    warn!(%provider, model, error = %err, "model probe failed");
                    last_error = err.to_string();
                }
            }
        }

        self.state = ConnectionState::Failed;
        Err(ProviderError::AllModelsFailed {
            provider,
            last: last_error,
        })
    }

    /// Issue one generation call, preferring the remembered working model
    /// over the provider default. No probing happens here; a failure is the
    /// caller's to handle.
    pub async fn generate(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let provider = self.provider.ok_or(ProviderError::UnknownProvider)?;
        let model = self
            .working_model()
            .unwrap_or_else(|| provider.default_model());

        let call = ChatCall {
            provider,
            api_key: &self.api_key,
            model,
            system,
            user,
        };
        self.backend
            .complete(call)
            .await
            .map_err(|err| ProviderError::Request(err.to_string()))
    }
}
