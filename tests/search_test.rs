mod helpers;

use helpers::{engine_with, test_engine, ScriptedBackend};
use hearth::store::MemStore;
use hearth::{FamilyMemberDraft, Message, DEFAULT_MEMBER_ID};

#[test]
fn vector_path_finds_semantically_close_memory() {
    let mut engine = test_engine();
    engine.add(
        &[Message::user("My favorite color is blue")],
        "casey",
        DEFAULT_MEMBER_ID,
    );

    let response = engine.search("favorite color", "casey", 5, DEFAULT_MEMBER_ID);
    assert!(!response.results.is_empty());
    assert_eq!(response.results[0].memory, "My favorite color is blue");
    assert!(response.results[0].relevance > 0.2);
    assert!(response.results[0].relevance <= 1.0);
}

#[test]
fn vector_path_takes_precedence_over_keyword_log() {
    let mut engine = test_engine();
    engine.add(
        &[Message::user("My favorite color is blue")],
        "casey",
        DEFAULT_MEMBER_ID,
    );

    // "noone" has no raw log at all, so a keyword fallback would return
    // nothing; results can only come from the persona's vector store.
    let response = engine.search("favorite color", "noone", 5, DEFAULT_MEMBER_ID);
    assert!(!response.results.is_empty());
    assert_eq!(response.results[0].memory, "My favorite color is blue");
}

#[test]
fn keyword_fallback_activates_on_empty_vector_store() {
    let mut engine = test_engine();

    // Populate casey's raw log through a different persona, leaving the
    // "scout" persona's vector store empty.
    let scout = engine.add_family_member(FamilyMemberDraft {
        name: Some("Scout".into()),
        role: None,
        description: None,
    });
    engine.add(
        &[Message::user("Reminder: urgent meeting notes for Friday")],
        "casey",
        DEFAULT_MEMBER_ID,
    );

    let response = engine.search("urgent meeting notes", "casey", 5, &scout.id);
    assert_eq!(response.results.len(), 1);
    assert_eq!(
        response.results[0].memory,
        "Reminder: urgent meeting notes for Friday"
    );
    assert!(response.results[0].relevance > 0.2);
    assert!(response.results[0].relevance <= 1.0);
}

#[test]
fn keyword_relevance_is_capped_at_one() {
    let mut engine = test_engine();
    let scout = engine.add_family_member(FamilyMemberDraft {
        name: Some("Scout".into()),
        role: None,
        description: None,
    });
    engine.add(
        &[Message::user("urgent urgent urgent urgent meeting meeting notes")],
        "casey",
        DEFAULT_MEMBER_ID,
    );

    let response = engine.search("urgent meeting notes", "casey", 5, &scout.id);
    assert_eq!(response.results.len(), 1);
    assert!(response.results[0].relevance <= 1.0);
}

#[test]
fn unrelated_queries_return_nothing() {
    let mut engine = test_engine();
    engine.add(
        &[Message::user("My favorite color is blue")],
        "casey",
        DEFAULT_MEMBER_ID,
    );

    let response = engine.search(
        "quarterly tax filing deadline",
        "casey",
        5,
        DEFAULT_MEMBER_ID,
    );
    assert!(response.results.is_empty());
}

#[test]
fn limit_truncates_ranked_results() {
    let mut engine = test_engine();
    for i in 0..8 {
        engine.add(
            &[Message::user(format!("favorite color note number {i}"))],
            "casey",
            DEFAULT_MEMBER_ID,
        );
    }

    let response = engine.search("favorite color note", "casey", 3, DEFAULT_MEMBER_ID);
    assert_eq!(response.results.len(), 3);

    // Descending by relevance.
    for pair in response.results.windows(2) {
        assert!(pair[0].relevance >= pair[1].relevance);
    }
}

#[test]
fn search_touches_last_accessed() {
    let mut engine = test_engine();
    let before = engine
        .family_member(DEFAULT_MEMBER_ID)
        .unwrap()
        .last_accessed
        .clone();

    engine.search("anything", "casey", 5, DEFAULT_MEMBER_ID);

    let after = engine
        .family_member(DEFAULT_MEMBER_ID)
        .unwrap()
        .last_accessed
        .clone();
    assert!(after >= before);
}

#[test]
fn search_results_are_not_persisted() {
    let store = MemStore::new();
    let mut engine = engine_with(store.clone(), "sk-test", ScriptedBackend::default());
    engine.add(
        &[Message::user("My favorite color is blue")],
        "casey",
        DEFAULT_MEMBER_ID,
    );
    let keys_before = store.len();

    engine.search("favorite color", "casey", 5, DEFAULT_MEMBER_ID);

    // A search writes nothing new beyond the persona touch (same key).
    assert_eq!(store.len(), keys_before);
}
