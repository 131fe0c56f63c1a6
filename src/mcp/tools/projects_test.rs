use serde_json::json;

use crate::codecks::spaces::list_query;
use crate::codecks::test_server::{FakeCodecks, PROJECT_ID};
use crate::mcp::test_support::{is_error, json, ready_server, text};

#[tokio::test(flavor = "multi_thread")]
async fn test_list_spaces() {
    let fake = FakeCodecks::spawn().await;
    fake.state().spaces = Some(json!([
        { "id": 7, "name": "Production", "defaultAllowedCardTypes": ["task", "doc"] },
    ]));
    let server = ready_server(&fake);

    let spaces = json(&server.list_spaces().await.unwrap());

    assert_eq!(
        spaces,
        json!([{ "id": 7, "name": "Production", "defaultAllowedCardTypes": ["task", "doc"] }])
    );
    let state = fake.state();
    assert_eq!(state.requests[0].body["query"], list_query(PROJECT_ID));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_spaces_without_spaces_is_error_reply() {
    let fake = FakeCodecks::spawn().await;
    let server = ready_server(&fake);

    let result = server.list_spaces().await.unwrap();

    assert!(is_error(&result));
    assert!(text(&result).starts_with("Error: Not found"));
}
