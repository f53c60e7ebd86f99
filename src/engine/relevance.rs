//! Relevance scoring.
//!
//! Two interchangeable strategies: cosine similarity over embeddings for the
//! vector path, and a token-overlap heuristic over raw text for the keyword
//! fallback. Both produce scores the engine compares against the same
//! configured floor.

/// Cosine similarity of two vectors.
///
/// Defined as 0.0 when the lengths differ or either vector has zero norm, so
/// no query can divide by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Lowercase whitespace tokenization, keeping tokens longer than 2 chars.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Token-overlap relevance of `content` against `query`.
///
/// `exact + partial_weight * partial`, capped at 1.0, where both components
/// are normalized by the number of distinct query tokens. A content token
/// that contains or is contained by some query token counts once toward the
/// partial score, so an exact match contributes to both components; the cap
/// bounds the sum.
pub fn keyword_relevance(query: &str, content: &str, partial_weight: f64) -> f64 {
    let query_tokens: std::collections::HashSet<String> = tokenize(query).into_iter().collect();
    if query_tokens.is_empty() {
        return 0.0;
    }
    let content_tokens = tokenize(content);

    let mut exact = 0usize;
    let mut partial = 0usize;
    for token in &content_tokens {
        if query_tokens.contains(token) {
            exact += 1;
        }
        if query_tokens
            .iter()
            .any(|q| token.contains(q.as_str()) || q.contains(token.as_str()))
        {
            partial += 1;
        }
    }

    let denom = query_tokens.len() as f64;
    let score = exact as f64 / denom + partial_weight * (partial as f64 / denom);
    score.min(1.0)
}
