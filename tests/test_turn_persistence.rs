// tests/test_turn_persistence.rs
// End-to-end conversation turns: client -> relay -> mock daemon, with the
// transcript persisted to a temp file at every step

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};

use cellmate::client::RelayClient;
use cellmate::provider::OllamaClient;
use cellmate::relay::{RelayState, create_router};
use cellmate::session::Session;
use cellmate::transcript::{Role, TranscriptStore};

const SECRET: &str = "test-secret";
const SYSTEM_PROMPT: &str = "You are a prisoner in the next cell.";

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Daemon stub that records the prompt it was asked to complete
fn recording_daemon(seen: Arc<Mutex<Vec<String>>>, reply: &'static str) -> Router {
    Router::new().route(
        "/api/generate",
        post(move |Json(body): Json<Value>| {
            let seen = seen.clone();
            async move {
                seen.lock()
                    .unwrap()
                    .push(body["prompt"].as_str().unwrap_or_default().to_string());
                Json(json!({ "response": reply, "done": true }))
            }
        }),
    )
}

async fn spawn_relay(daemon_addr: SocketAddr) -> SocketAddr {
    let state = RelayState {
        daemon: OllamaClient::new(format!("http://{daemon_addr}"), Duration::from_secs(5)),
        default_model: "deepseek-coder:6.7b".into(),
        secret: Some(SECRET.into()),
        max_skew_secs: 300,
    };
    spawn(create_router(state)).await
}

fn session_at(relay: SocketAddr, path: std::path::PathBuf) -> Session {
    let client = RelayClient::new(
        format!("http://{relay}"),
        "llama3:8b",
        SECRET,
        Duration::from_secs(5),
    );
    Session::new(TranscriptStore::new(path), client, SYSTEM_PROMPT.into())
}

#[tokio::test]
async fn successful_turn_appends_user_and_assistant() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let daemon = spawn(recording_daemon(seen, "hi there")).await;
    let relay = spawn_relay(daemon).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.json");
    let session = session_at(relay, path.clone());

    let reply = session.turn("hello").await.unwrap();
    assert_eq!(reply, "hi there");

    let transcript = TranscriptStore::new(path).load().unwrap();
    assert_eq!(transcript.system_prompt, SYSTEM_PROMPT);
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.history[0].role, Role::User);
    assert_eq!(transcript.history[0].content, "hello");
    assert_eq!(transcript.history[1].role, Role::Assistant);
    assert_eq!(transcript.history[1].content, "hi there");
}

#[tokio::test]
async fn n_turns_persist_2n_alternating_entries() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let daemon = spawn(recording_daemon(seen, "mhm")).await;
    let relay = spawn_relay(daemon).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.json");
    let session = session_at(relay, path.clone());

    for i in 0..3 {
        session.turn(&format!("question {i}")).await.unwrap();
    }

    let transcript = TranscriptStore::new(path).load().unwrap();
    assert_eq!(transcript.len(), 6);
    for (i, turn) in transcript.history.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(turn.role, expected, "entry {i} out of order");
    }
}

#[tokio::test]
async fn relayed_prompt_is_the_flattened_transcript() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let daemon = spawn(recording_daemon(seen.clone(), "hi there")).await;
    let relay = spawn_relay(daemon).await;

    let dir = tempfile::tempdir().unwrap();
    let session = session_at(relay, dir.path().join("transcript.json"));

    session.turn("hello").await.unwrap();
    session.turn("who are you").await.unwrap();

    let prompts = seen.lock().unwrap();
    assert_eq!(
        prompts[0],
        format!("{SYSTEM_PROMPT}\nUser: hello")
    );
    assert_eq!(
        prompts[1],
        format!(
            "{SYSTEM_PROMPT}\nUser: hello\nAssistant: hi there\nUser: who are you"
        )
    );
}

#[tokio::test]
async fn failed_turn_keeps_user_entry_only() {
    let daemon = spawn(Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;
    let relay = spawn_relay(daemon).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.json");
    let session = session_at(relay, path.clone());

    assert!(session.turn("hello").await.is_err());

    let transcript = TranscriptStore::new(path).load().unwrap();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript.history[0].role, Role::User);
    assert_eq!(transcript.history[0].content, "hello");
}

#[tokio::test]
async fn empty_completion_is_a_failed_turn() {
    let daemon = spawn(Router::new().route(
        "/api/generate",
        post(|| async { Json(json!({ "response": "", "done": true })) }),
    ))
    .await;
    let relay = spawn_relay(daemon).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.json");
    let session = session_at(relay, path.clone());

    let err = session.turn("hello").await.unwrap_err();
    assert!(err.to_string().contains("empty completion"));

    let transcript = TranscriptStore::new(path).load().unwrap();
    assert_eq!(transcript.len(), 1);
}

#[tokio::test]
async fn reset_clears_history_but_keeps_system_prompt() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let daemon = spawn(recording_daemon(seen, "hi there")).await;
    let relay = spawn_relay(daemon).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.json");
    let session = session_at(relay, path.clone());

    session.turn("hello").await.unwrap();
    session.reset().unwrap();

    let transcript = TranscriptStore::new(path).load().unwrap();
    assert!(transcript.is_empty());
    assert_eq!(transcript.system_prompt, SYSTEM_PROMPT);
}
