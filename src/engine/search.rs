//! Two-path search: vector similarity first, keyword fallback second.
//!
//! Any non-empty vector result wins outright; the keyword heuristic over the
//! raw log is consulted only when the vector path produced nothing. Both
//! paths touch the persona's `last_accessed` before returning.

use tracing::{debug, warn};

use super::relevance::{cosine_similarity, keyword_relevance};
use super::types::{SearchResponse, SearchResult};
use super::MemoryEngine;

impl MemoryEngine {
    /// Relevance-ranked search for `query`, scoped to a user's raw log and a
    /// family member's vector store.
    pub fn search(
        &mut self,
        query: &str,
        user_id: &str,
        limit: usize,
        family_member_id: &str,
    ) -> SearchResponse {
        let mut results = self.vector_search(query, limit, family_member_id);

        if results.is_empty() {
            debug!(user_id, "vector path empty; falling back to keyword search");
            results = self.keyword_search(query, user_id, limit);
        }

        self.touch_member(family_member_id);
        SearchResponse { results }
    }

    /// Cosine-ranked scan of the persona's vector store. Items without an
    /// embedding are skipped; a query-embedding failure degrades to an empty
    /// result so the keyword path can take over.
    fn vector_search(
        &mut self,
        query: &str,
        limit: usize,
        family_member_id: &str,
    ) -> Vec<SearchResult> {
        let floor = self.retrieval_floor();

        if self.vector_items_mut(family_member_id).is_empty() {
            return Vec::new();
        }

        let query_embedding = match self.embed_query(query) {
            Some(embedding) => embedding,
            None => return Vec::new(),
        };

        let items = self.vector_items_mut(family_member_id);
        let mut hits: Vec<SearchResult> = items
            .iter()
            .filter_map(|item| {
                let embedding = item.embedding.as_ref()?;
                let similarity = cosine_similarity(&query_embedding, embedding);
                (similarity > floor).then(|| SearchResult {
                    memory: item.content.clone(),
                    relevance: similarity,
                    timestamp: item.metadata.timestamp.clone(),
                })
            })
            .collect();

        sort_and_truncate(&mut hits, limit);
        hits
    }

    /// Token-overlap scan of the user's raw log.
    fn keyword_search(&mut self, query: &str, user_id: &str, limit: usize) -> Vec<SearchResult> {
        let floor = self.retrieval_floor();
        let partial_weight = self.partial_weight();

        let entries = self.log_entries_mut(user_id);
        let mut hits: Vec<SearchResult> = entries
            .iter()
            .filter_map(|entry| {
                let relevance = keyword_relevance(query, &entry.content, partial_weight);
                (relevance > floor).then(|| SearchResult {
                    memory: entry.content.clone(),
                    relevance,
                    timestamp: entry.timestamp.clone(),
                })
            })
            .collect();

        sort_and_truncate(&mut hits, limit);
        hits
    }

    fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        match self.embedder.embed(query) {
            Ok(embedding) => Some(embedding),
            Err(err) => {
                warn!(error = %err, "query embedding failed; skipping vector path");
                None
            }
        }
    }

    fn retrieval_floor(&self) -> f64 {
        self.retrieval.relevance_floor
    }

    fn partial_weight(&self) -> f64 {
        self.retrieval.partial_match_weight
    }
}

fn sort_and_truncate(hits: &mut Vec<SearchResult>, limit: usize) {
    hits.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
}
