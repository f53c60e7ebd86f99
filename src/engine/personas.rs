//! Family-member registry.
//!
//! CRUD over the persona records that scope every memory operation. The
//! `"default"` persona is synthesized on first load and protected from
//! deletion; deleting any other persona cascades to its vector store.

use chrono::Utc;
use tracing::{debug, info};

use super::types::{FamilyMember, FamilyMemberDraft};
use super::{MemoryEngine, DEFAULT_MEMBER_ID};

impl MemoryEngine {
    /// All family members, as a defensive copy.
    pub fn family_members(&self) -> Vec<FamilyMember> {
        self.members.clone()
    }

    /// Look up one family member by id.
    pub fn family_member(&self, id: &str) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Create a family member: fresh id, both timestamps set, persisted, and
    /// an empty vector store initialized for the new id.
    pub fn add_family_member(&mut self, draft: FamilyMemberDraft) -> FamilyMember {
        let now = Utc::now().to_rfc3339();
        let member = FamilyMember {
            id: uuid::Uuid::now_v7().to_string(),
            name: draft.name.unwrap_or_else(|| "New Member".into()),
            role: draft.role.unwrap_or_else(|| "Assistant".into()),
            description: draft.description.unwrap_or_default(),
            created_at: now.clone(),
            last_accessed: now,
        };
        self.members.push(member.clone());
        self.persist_members();

        self.vector_items_mut(&member.id);
        self.persist_vectors(&member.id);

        info!(id = %member.id, name = %member.name, "family member created");
        member
    }

    /// Merge caller-supplied fields into an existing member. Returns `None`
    /// for an unknown id. `created_at` is never touched.
    pub fn update_family_member(
        &mut self,
        id: &str,
        draft: FamilyMemberDraft,
    ) -> Option<FamilyMember> {
        let member = self.members.iter_mut().find(|m| m.id == id)?;
        if let Some(name) = draft.name {
            member.name = name;
        }
        if let Some(role) = draft.role {
            member.role = role;
        }
        if let Some(description) = draft.description {
            member.description = description;
        }
        let updated = member.clone();
        self.persist_members();
        Some(updated)
    }

    /// Delete a family member and its vector store. Refuses the reserved
    /// `"default"` persona and unknown ids, returning `false` without any
    /// mutation.
    pub fn delete_family_member(&mut self, id: &str) -> bool {
        if id == DEFAULT_MEMBER_ID {
            debug!("refusing to delete the default family member");
            return false;
        }
        let Some(index) = self.members.iter().position(|m| m.id == id) else {
            return false;
        };

        self.members.remove(index);
        self.persist_members();
        self.remove_vector_store(id);

        info!(id, "family member deleted");
        true
    }

    /// Stamp `last_accessed` on a persona and persist. A missing persona is
    /// not an error: search may legitimately run against a deleted id.
    pub(crate) fn touch_member(&mut self, id: &str) {
        let Some(member) = self.members.iter_mut().find(|m| m.id == id) else {
            return;
        };
        member.last_accessed = Utc::now().to_rfc3339();
        self.persist_members();
    }

    /// Synthesize the `"default"` persona when the registry loads empty.
    pub(crate) fn bootstrap_default_member(&mut self) {
        if !self.members.is_empty() {
            return;
        }
        let now = Utc::now().to_rfc3339();
        self.members.push(FamilyMember {
            id: DEFAULT_MEMBER_ID.to_string(),
            name: "AI Assistant".into(),
            role: "Assistant".into(),
            description: "General-purpose family assistant".into(),
            created_at: now.clone(),
            last_accessed: now,
        });
        self.persist_members();
        info!("bootstrapped default family member");
    }
}
