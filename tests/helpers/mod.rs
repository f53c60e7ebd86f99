#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use hearth::config::RetrievalConfig;
use hearth::embedding::hashed::HashedEmbeddingProvider;
use hearth::embedding::EmbeddingProvider;
use hearth::store::{MemStore, Store};
use hearth::{ChatBackend, ChatCall, GenerationClient, MemoryEngine};

/// One recorded chat-completion call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub system: String,
    pub user: String,
}

/// Scripted [`ChatBackend`]: fails for the listed models, answers with a
/// fixed reply otherwise, and records every call for assertions.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    pub reply: String,
    pub failing_models: Vec<String>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn failing_for(models: &[&str]) -> Self {
        Self {
            reply: "OK".to_string(),
            failing_models: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, call: ChatCall<'_>) -> Result<String> {
        if self.failing_models.iter().any(|m| m == call.model) {
            anyhow::bail!("model {} is unavailable", call.model);
        }
        self.calls.lock().unwrap().push(RecordedCall {
            model: call.model.to_string(),
            system: call.system.to_string(),
            user: call.user.to_string(),
        });
        Ok(self.reply.clone())
    }
}

/// Embedding provider that always errors, for exercising the degraded
/// item-without-vector path.
pub struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!("embedding backend offline")
    }
}

/// Store whose every operation fails, for exercising memory-only degraded
/// mode.
pub struct FailingStore;

impl Store for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        anyhow::bail!("storage offline: {key}")
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("storage offline: {key}")
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        anyhow::bail!("storage offline: {key}")
    }
}

/// Engine assembled from arbitrary store and embedder, initialized and ready.
pub fn engine_with_parts(
    store: Box<dyn Store>,
    embedder: Box<dyn EmbeddingProvider>,
    backend: ScriptedBackend,
) -> MemoryEngine {
    let generation = GenerationClient::new("sk-test", Box::new(backend)).unwrap();
    let mut engine = MemoryEngine::new(store, embedder, generation, RetrievalConfig::default());
    engine.init().unwrap();
    engine
}

/// Engine over a given store and scripted backend, initialized and ready.
pub fn engine_with(store: MemStore, api_key: &str, backend: ScriptedBackend) -> MemoryEngine {
    let generation = GenerationClient::new(api_key, Box::new(backend)).unwrap();
    let mut engine = MemoryEngine::new(
        Box::new(store),
        Box::new(HashedEmbeddingProvider::new()),
        generation,
        RetrievalConfig::default(),
    );
    engine.init().unwrap();
    engine
}

/// Engine over a fresh in-memory store with an OpenAI-format key.
pub fn test_engine() -> MemoryEngine {
    engine_with(MemStore::new(), "sk-test", ScriptedBackend::replying("OK"))
}
