//! Core engine type definitions.
//!
//! Everything here that reaches the durable layer derives serde; the JSON
//! shape of these structs is the persistence contract and must stay stable
//! across restarts.

use serde::{Deserialize, Serialize};

/// A persona scoping memory access. The id `"default"` is reserved and can
/// never be deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    /// Stable unique id (UUID v7, except for the bootstrap `"default"`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display role (e.g. `"Assistant"`, `"Grandmother"`).
    pub role: String,
    /// Free-form description used in generation prompts.
    pub description: String,
    /// ISO 8601 creation timestamp, set once.
    pub created_at: String,
    /// ISO 8601 timestamp of the last add/search/generate touching this
    /// persona.
    pub last_accessed: String,
}

/// Caller-supplied fields for creating or updating a family member.
#[derive(Debug, Clone, Default)]
pub struct FamilyMemberDraft {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRole {
    User,
    Assistant,
}

impl MemoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MemoryRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("unknown memory role: {s}")),
        }
    }
}

/// One message handed to [`crate::engine::MemoryEngine::add`].
#[derive(Debug, Clone)]
pub struct Message {
    pub role: MemoryRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MemoryRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MemoryRole::Assistant,
            content: content.into(),
        }
    }
}

/// One turn of the append-only per-user raw log. Entries are never mutated,
/// only appended or bulk-cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub role: MemoryRole,
    pub content: String,
    pub timestamp: String,
}

/// Metadata carried by every vector-store item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub timestamp: String,
    /// Role string of the originating message.
    pub source: String,
    /// Item category; always `"message"` for conversation-derived items.
    #[serde(rename = "type")]
    pub kind: String,
}

/// One semantically indexed memory, scoped by family member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorItem {
    /// UUID v7 generated at insert time.
    pub id: String,
    pub content: String,
    pub metadata: ItemMetadata,
    /// Absent when embedding creation failed; the item then exists but is
    /// excluded from vector search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// A single ranked search hit. Ephemeral — produced fresh per query, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub memory: String,
    /// Normalized relevance in `[0, 1]`.
    pub relevance: f64,
    pub timestamp: String,
}

/// Response from [`crate::engine::MemoryEngine::search`].
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
