//! Request pipeline behavior against a scripted transport.

mod common;

use common::{envelope, harness, harness_with, settings, ScriptedTransport};
use gemrelay_client::{Json, RelayError, Text};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

const QUOTA_BODY: &str = r#"{"error": {"code": 429, "message": "You exceeded your current quota.", "status": "RESOURCE_EXHAUSTED"}}"#;

#[derive(Debug, Deserialize, PartialEq)]
struct Npc {
    name: String,
    trade: String,
}

fn npc_answer() -> String {
    envelope(r#"{"name": "Aldric", "trade": "smith"}"#)
}

#[tokio::test]
async fn test_zero_budget_fails_without_network() {
    let h = harness(&["A"], ScriptedTransport::new().respond(200, npc_answer()));
    let failures = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();

    let counter = failures.clone();
    h.client.pipeline().submit_with_retries(
        "Describe a smith",
        0,
        |_: Json<Npc>| panic!("must not succeed"),
        move |err| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(err);
        },
    );

    let err = rx.await.unwrap();
    assert!(matches!(err, RelayError::RetriesExhausted { attempts: 0 }));
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(h.pool().snapshot()[0].request_count, 0);
}

#[tokio::test]
async fn test_failing_transport_exhausts_budget() {
    let h = harness(
        &["A"],
        ScriptedTransport::new().fail().fail().fail().fail(),
    );

    let result = h
        .client
        .pipeline()
        .request_with_retries::<Json<Npc>>("Describe a smith", 3)
        .await;

    assert!(matches!(result, Err(RelayError::RetriesExhausted { attempts: 3 })));
    assert_eq!(h.transport.call_count(), 3);
    assert_eq!(h.pool().snapshot()[0].request_count, 3);

    // First attempt runs immediately, each retry waits the request delay.
    let delays = h.scheduler.delays();
    assert_eq!(delays.len(), 4);
    assert_eq!(delays[0], Duration::ZERO);
    assert!(delays[1..].iter().all(|d| *d == Duration::from_secs(5)));
}

#[tokio::test]
async fn test_success_decodes_struct() {
    let h = harness(&["A"], ScriptedTransport::new().respond(200, npc_answer()));

    let Json(npc) = h
        .client
        .ask::<Json<Npc>>("Describe a smith")
        .await
        .unwrap();

    assert_eq!(npc.name, "Aldric");
    assert_eq!(npc.trade, "smith");
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn test_prompt_carries_rules_prefix() {
    let h = harness(&["A"], ScriptedTransport::new().respond(200, npc_answer()));

    h.client.ask::<Json<Npc>>("Describe a smith").await.unwrap();

    let calls = h.transport.calls();
    assert_eq!(
        calls[0].prompt,
        "[Rules: `Use Spanish language.`, `Do not use \" character.`] Describe a smith"
    );
    assert_eq!(calls[0].key, "A");
}

#[tokio::test]
async fn test_quota_marks_credential_and_rotates() {
    let h = harness(
        &["A", "B"],
        ScriptedTransport::new()
            .respond(429, QUOTA_BODY)
            .respond(200, npc_answer()),
    );

    let result = h.client.ask::<Json<Npc>>("Describe a smith").await;
    assert!(result.is_ok());

    let calls = h.transport.calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].key, calls[1].key);

    let snapshot = h.pool().snapshot();
    let exhausted: Vec<_> = snapshot.iter().filter(|c| c.exhausted).collect();
    assert_eq!(exhausted.len(), 1);
    let expected_id = if calls[0].key == "A" { "key-0" } else { "key-1" };
    assert_eq!(exhausted[0].id, expected_id);
}

#[tokio::test]
async fn test_quota_match_is_case_insensitive() {
    let h = harness(
        &["A"],
        ScriptedTransport::new().respond(429, "QUOTA EXCEEDED"),
    );

    let result = h.client.ask::<Json<Npc>>("Describe a smith").await;

    assert!(matches!(result, Err(RelayError::PoolExhausted)));
    assert!(h.pool().snapshot()[0].exhausted);
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn test_exhausted_credential_is_skipped() {
    let h = harness(
        &["A", "B"],
        ScriptedTransport::new()
            .respond(200, npc_answer())
            .respond(200, npc_answer())
            .respond(200, npc_answer()),
    );
    h.pool().mark_exhausted("key-0");

    for _ in 0..3 {
        h.client.ask::<Json<Npc>>("Describe a smith").await.unwrap();
    }

    assert!(h.transport.calls().iter().all(|c| c.key == "B"));
}

#[tokio::test]
async fn test_other_rejection_retries_without_marking() {
    let h = harness(
        &["A"],
        ScriptedTransport::new()
            .respond(503, "The model is overloaded.")
            .respond(200, npc_answer()),
    );

    let result = h.client.ask::<Json<Npc>>("Describe a smith").await;

    assert!(result.is_ok());
    assert_eq!(h.transport.call_count(), 2);
    assert!(!h.pool().snapshot()[0].exhausted);
}

#[tokio::test]
async fn test_empty_body_is_terminal() {
    let h = harness(
        &["A"],
        ScriptedTransport::new()
            .respond(200, "")
            .respond(200, npc_answer()),
    );

    let result = h.client.ask::<Json<Npc>>("Describe a smith").await;

    assert!(matches!(result, Err(RelayError::EmptyBody)));
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn test_malformed_answer_is_retried() {
    let h = harness(
        &["A"],
        ScriptedTransport::new()
            .respond(200, envelope("I would rather not."))
            .respond(200, npc_answer()),
    );

    let result = h.client.ask::<Json<Npc>>("Describe a smith").await;

    assert!(result.is_ok());
    assert_eq!(h.transport.call_count(), 2);
}

#[tokio::test]
async fn test_text_fallback_for_string_answers() {
    let h = harness(
        &["A"],
        ScriptedTransport::new().respond(200, r#"{text: "hola", index: 0}"#),
    );

    let answer: String = h.client.ask("Say hello").await.unwrap();

    assert_eq!(answer, "hola");
}

#[tokio::test]
async fn test_plain_text_answer_from_envelope() {
    let h = harness(
        &["A"],
        ScriptedTransport::new().respond(200, envelope("Hello there")),
    );

    let Text(answer) = h.client.ask("Say hello").await.unwrap();

    assert_eq!(answer, "Hello there");
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn test_exhausted_pool_fails_fast() {
    let h = harness(&["A", "B"], ScriptedTransport::new());
    h.pool().mark_exhausted("key-0");
    h.pool().mark_exhausted("key-1");

    let result = h.client.ask::<String>("Say hello").await;

    assert!(matches!(result, Err(RelayError::PoolExhausted)));
    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(h.scheduler.delays(), vec![Duration::ZERO]);
}

#[tokio::test]
async fn test_configured_budget_is_used() {
    let h = harness_with(
        settings().with_max_retries(2),
        &["A"],
        ScriptedTransport::new(),
    );

    let result = h.client.ask::<String>("Say hello").await;

    assert!(matches!(result, Err(RelayError::RetriesExhausted { attempts: 2 })));
    assert_eq!(h.transport.call_count(), 2);
}
