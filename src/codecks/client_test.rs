use crate::codecks::client::{CallMode, CodecksClient};
use crate::codecks::error::CodecksError;
use crate::codecks::test_server::{FakeCodecks, SUBDOMAIN, TOKEN, init_crypto};
use crate::config::Config;
use serde_json::{Value, json};

#[test]
fn test_call_mode_display() {
    assert_eq!(CallMode::Query.to_string(), "query");
    assert_eq!(CallMode::Dispatch("cards/create").to_string(), "dispatch:cards/create");
}

#[test]
fn test_new_strips_trailing_slash() {
    init_crypto();
    let config = Config::new("acme", "token", "http://localhost:9999/", 5).unwrap();
    let client = CodecksClient::new(&config).unwrap();
    assert_eq!(client.base_url(), "http://localhost:9999");
    assert_eq!(client.subdomain(), "acme");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_wraps_payload_and_sends_auth_headers() {
    let server = FakeCodecks::spawn().await;
    server.state().add_deck("Backlog");
    let client = server.client();

    let payload = json!({ "_root": [{ "account": [{ "decks": ["title"] }] }] });
    let response: Value = client.query(&payload).await.expect("query should succeed");
    assert!(response["deck"].is_object());

    let state = server.state();
    let request = &state.requests[0];
    assert_eq!(request.path, "/");
    assert_eq!(request.body, json!({ "query": payload }));
    assert_eq!(request.account_header.as_deref(), Some(SUBDOMAIN));
    assert_eq!(request.token_header.as_deref(), Some(TOKEN));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dispatch_sends_payload_as_is_to_action_path() {
    let server = FakeCodecks::spawn().await;
    let client = server.client();

    let payload = json!({ "title": "Sprint", "projectId": "p", "userId": "u", "spaceId": 1 });
    let response: Value = client
        .dispatch("decks/create", &payload)
        .await
        .expect("dispatch should succeed");
    assert_eq!(response["title"], "Sprint");

    let state = server.state();
    assert_eq!(state.requests[0].path, "/dispatch/decks/create");
    assert_eq!(state.requests[0].body, payload);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_success_status_carries_status_and_body() {
    let server = FakeCodecks::spawn().await;
    server.state().failure = Some((500, "boom".to_string()));
    let client = server.client();

    let err = client
        .query::<Value, _>(&json!({}))
        .await
        .expect_err("500 should fail");

    match &err {
        CodecksError::Remote { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Remote error, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("boom"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_json_is_transport_error() {
    let server = FakeCodecks::spawn().await;
    server.state().raw_body = Some("not json".to_string());
    let client = server.client();

    let err = client.query::<Value, _>(&json!({})).await.unwrap_err();
    assert!(matches!(err, CodecksError::Transport { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_server_is_transport_error() {
    init_crypto();
    // Port 9 (discard) on localhost is not listening in test environments.
    let config = Config::new("acme", "token", "http://127.0.0.1:9", 2).unwrap();
    let client = CodecksClient::new(&config).unwrap();

    let err = client.query::<Value, _>(&json!({})).await.unwrap_err();
    assert!(matches!(err, CodecksError::Transport { .. }));
}
