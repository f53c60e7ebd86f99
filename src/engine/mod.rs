//! The memory engine.
//!
//! [`MemoryEngine`] owns every persisted map — the family-member list, the
//! per-user raw logs, and the per-persona vector stores — for the lifetime
//! of the process, with the key-value [`Store`] as the sole authority across
//! restarts. Operations are plain sequential methods: there is no internal
//! locking, and callers who need strict ordering on one
//! `(user, family member)` pair serialize their own calls.

pub mod personas;
pub mod relevance;
pub mod search;
pub mod types;

use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::provider::GenerationClient;
use crate::store::{self, Store};
use types::{ItemMetadata, LogEntry, Message, SearchResponse, VectorItem};

/// User id applied when the caller does not name one.
pub const DEFAULT_USER_ID: &str = "default_user";

/// The reserved bootstrap persona id.
pub const DEFAULT_MEMBER_ID: &str = "default";

pub struct MemoryEngine {
    store: Box<dyn Store>,
    embedder: Box<dyn EmbeddingProvider>,
    generation: GenerationClient,
    retrieval: RetrievalConfig,
    members: Vec<types::FamilyMember>,
    logs: HashMap<String, Vec<LogEntry>>,
    vectors: HashMap<String, Vec<VectorItem>>,
}

impl MemoryEngine {
    /// Assemble an engine from its parts. Touches no durable state — call
    /// [`init`](Self::init) before the first memory operation.
    pub fn new(
        store: Box<dyn Store>,
        embedder: Box<dyn EmbeddingProvider>,
        generation: GenerationClient,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            generation,
            retrieval,
            members: Vec::new(),
            logs: HashMap::new(),
            vectors: HashMap::new(),
        }
    }

    /// Build the production wiring: SQLite store, hashed embedder, HTTP chat
    /// backend, key taken from config. Fails fast on a missing API key.
    pub fn from_config(config: &crate::config::HearthConfig) -> Result<Self> {
        let store = crate::store::SqliteStore::open(config.resolved_db_path())?;
        let embedder = crate::embedding::create_provider(&config.embedding)?;
        let generation = GenerationClient::new(
            config.provider.api_key.clone(),
            Box::new(crate::provider::HttpChatBackend::new()),
        )?;
        Ok(Self::new(
            Box::new(store),
            embedder,
            generation,
            config.retrieval.clone(),
        ))
    }

    /// Load personas from the store and bootstrap the `"default"` one if the
    /// list is empty. Idempotent: a second init never duplicates it.
    pub fn init(&mut self) -> Result<()> {
        self.members = self.load_json(store::PERSONAS_KEY).unwrap_or_default();
        self.bootstrap_default_member();
        Ok(())
    }

    /// Probe the generation provider's model list. See
    /// [`GenerationClient::test_connection`].
    pub async fn test_connection(&mut self) -> Result<bool> {
        Ok(self.generation.test_connection().await?)
    }

    /// The model recorded by a successful connectivity probe, if any.
    pub fn working_model(&self) -> Option<&str> {
        self.generation.working_model()
    }

    /// Record a batch of conversation turns: append to the raw log for
    /// `user_id`, index each message into the vector store for
    /// `family_member_id`, and touch the persona. All messages share one
    /// timestamp. An embedding failure is logged and the affected item is
    /// stored without a vector; it never aborts the log append or the touch.
    pub fn add(&mut self, messages: &[Message], user_id: &str, family_member_id: &str) {
        if messages.is_empty() {
            return;
        }
        let timestamp = Utc::now().to_rfc3339();

        // 1. Raw log append
        let log = self.log_entries_mut(user_id);
        for message in messages {
            log.push(LogEntry {
                role: message.role,
                content: message.content.clone(),
                timestamp: timestamp.clone(),
            });
        }
        self.persist_log(user_id);

        // 2. Vector index append (embedding failures degrade per item)
        for message in messages {
            let embedding = match self.embedder.embed(&message.content) {
                Ok(v) => Some(v),
                Err(err) => {
                    warn!(error = %err, "embedding failed; storing item without vector");
                    None
                }
            };
            let item = VectorItem {
                id: uuid::Uuid::now_v7().to_string(),
                content: message.content.clone(),
                metadata: ItemMetadata {
                    timestamp: timestamp.clone(),
                    source: message.role.to_string(),
                    kind: "message".into(),
                },
                embedding,
            };
            self.vector_items_mut(family_member_id).push(item);
        }
        self.persist_vectors(family_member_id);

        // 3. Persona touch
        self.touch_member(family_member_id);
        debug!(
            user_id,
            family_member_id,
            count = messages.len(),
            "messages recorded"
        );
    }

    /// Clear the raw log for `user_id`, plus either one named vector store
    /// or, when no persona is given, every known persona's store.
    pub fn clear_memories(&mut self, user_id: &str, family_member_id: Option<&str>) {
        self.logs.insert(user_id.to_string(), Vec::new());
        self.remove_key(&store::memory_log_key(user_id));

        let targets: Vec<String> = match family_member_id {
            Some(id) => vec![id.to_string()],
            None => self.members.iter().map(|m| m.id.clone()).collect(),
        };
        for id in targets {
            self.vectors.insert(id.clone(), Vec::new());
            self.remove_key(&store::vector_store_key(&id));
        }
    }

    /// Generate a reply personalized by stored memories, then record the
    /// exchange itself as two new memories.
    ///
    /// Generation failures propagate as errors; this layer never substitutes
    /// apology text.
    pub async fn generate_with_memory(
        &mut self,
        prompt: &str,
        user_id: &str,
        family_member_id: &str,
    ) -> Result<String> {
        let (name, role) = match self.family_member(family_member_id) {
            Some(member) => (member.name.clone(), member.role.clone()),
            None => ("AI Assistant".to_string(), "Assistant".to_string()),
        };

        let limit = self.retrieval.default_limit;
        let hits = self.search(prompt, user_id, limit, family_member_id);
        let system = build_system_prompt(&name, &role, &hits);

        let reply = self.generation.generate(&system, prompt).await?;

        self.add(
            &[Message::user(prompt), Message::assistant(reply.clone())],
            user_id,
            family_member_id,
        );
        Ok(reply)
    }

    // ── Shared state plumbing ─────────────────────────────────────────────

    /// Raw log for a user, hydrating from the store on first touch.
    pub(crate) fn log_entries_mut(&mut self, user_id: &str) -> &mut Vec<LogEntry> {
        if !self.logs.contains_key(user_id) {
            let loaded = self
                .load_json(&store::memory_log_key(user_id))
                .unwrap_or_default();
            self.logs.insert(user_id.to_string(), loaded);
        }
        self.logs.get_mut(user_id).expect("entry just inserted")
    }

    /// Vector store for a persona, hydrating from the store on first touch.
    /// An unknown persona id gets an empty store; the create is explicit
    /// here rather than a side effect of indexing.
    pub(crate) fn vector_items_mut(&mut self, family_member_id: &str) -> &mut Vec<VectorItem> {
        if !self.vectors.contains_key(family_member_id) {
            let loaded = self
                .load_json(&store::vector_store_key(family_member_id))
                .unwrap_or_default();
            self.vectors.insert(family_member_id.to_string(), loaded);
        }
        self.vectors
            .get_mut(family_member_id)
            .expect("entry just inserted")
    }

    pub(crate) fn persist_log(&mut self, user_id: &str) {
        if let Some(entries) = self.logs.get(user_id) {
            let payload = entries.clone();
            self.save_json(&store::memory_log_key(user_id), &payload);
        }
    }

    pub(crate) fn persist_vectors(&mut self, family_member_id: &str) {
        if let Some(items) = self.vectors.get(family_member_id) {
            let payload = items.clone();
            self.save_json(&store::vector_store_key(family_member_id), &payload);
        }
    }

    pub(crate) fn persist_members(&mut self) {
        let payload = self.members.clone();
        self.save_json(store::PERSONAS_KEY, &payload);
    }

    pub(crate) fn remove_vector_store(&mut self, family_member_id: &str) {
        self.vectors.remove(family_member_id);
        self.remove_key(&store::vector_store_key(family_member_id));
    }

    /// Persistence faults are recoverable: log and continue against
    /// in-memory state only.
    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                warn!(key, error = %err, "serialization failed; skipping persist");
                return;
            }
        };
        if let Err(err) = self.store.set(key, &json) {
            warn!(key, error = %err, "persist failed; continuing in memory only");
        }
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(key, error = %err, "load failed; starting empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "stored payload unreadable; starting empty");
                None
            }
        }
    }

    fn remove_key(&mut self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(key, error = %err, "remove failed; continuing in memory only");
        }
    }
}

/// Compose the generation system prompt: persona identity plus the retrieved
/// memories as bulleted lines, or an explicit marker when nothing matched.
fn build_system_prompt(name: &str, role: &str, hits: &SearchResponse) -> String {
    let memories = if hits.results.is_empty() {
        "No relevant memories found.".to_string()
    } else {
        hits.results
            .iter()
            .map(|hit| format!("- [{}] {}", human_timestamp(&hit.timestamp), hit.memory))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are {name}, a {role} in an AI family assistant.\n\n\
         Relevant memories from previous conversations:\n{memories}\n\n\
         Use these memories to personalize your response. Stay in character \
         as {name} and answer as a {role} would."
    )
}

/// Render an RFC 3339 timestamp as `YYYY-MM-DD HH:MM`; fall back to the raw
/// string when it does not parse.
fn human_timestamp(timestamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => timestamp.to_string(),
    }
}
