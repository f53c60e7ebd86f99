//! Per-persona memory engine for AI family assistants.
//!
//! Hearth records conversation turns per user, maintains a naive incremental
//! vector index per "family member" persona, answers relevance-ranked
//! searches, and drives LLM generation with provider detection and model
//! fallback. Everything durable lives behind a small key-value store.
//!
//! # Architecture
//!
//! - **Storage**: a string key-value [`store::Store`] (SQLite in production,
//!   in-memory for tests) holding JSON payloads under stable keys
//! - **Embeddings**: pluggable [`embedding::EmbeddingProvider`]; the default
//!   is a deterministic hashed placeholder
//! - **Search**: cosine similarity over the vector store, with a
//!   token-overlap keyword fallback over the raw conversation log
//! - **Generation**: OpenAI or Groq, detected from the API key format, with
//!   a priority-ordered model probe that remembers the first working model
//!
//! # Modules
//!
//! - [`config`] — configuration loading from TOML files and environment variables
//! - [`store`] — the persistent key-value layer and key naming conventions
//! - [`embedding`] — text-to-vector adapter
//! - [`provider`] — generation provider detection, probing, and HTTP client
//! - [`engine`] — the memory engine: add, search, generate, persona registry

pub mod config;
pub mod embedding;
pub mod engine;
pub mod provider;
pub mod store;

pub use engine::types::{
    FamilyMember, FamilyMemberDraft, LogEntry, MemoryRole, Message, SearchResponse, SearchResult,
    VectorItem,
};
pub use engine::{MemoryEngine, DEFAULT_MEMBER_ID, DEFAULT_USER_ID};
pub use provider::{ChatBackend, ChatCall, GenerationClient, Provider, ProviderError};
