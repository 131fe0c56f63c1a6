//! Helpers shared by the MCP tool tests.

use rmcp::model::{CallToolResult, RawContent};
use serde_json::Value;

use crate::codecks::SessionContext;
use crate::codecks::test_server::{FakeCodecks, ready_context};

use super::CodecksServer;

/// Server over `fake` with a context as it looks after startup.
pub(crate) fn ready_server(fake: &FakeCodecks) -> CodecksServer {
    CodecksServer::new(fake.client(), ready_context())
}

/// Server over `fake` whose startup never ran.
pub(crate) fn uninitialized_server(fake: &FakeCodecks) -> CodecksServer {
    CodecksServer::new(fake.client(), SessionContext::new())
}

pub(crate) fn text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    }
}

pub(crate) fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}

/// Parse a successful reply as JSON.
pub(crate) fn json(result: &CallToolResult) -> Value {
    assert!(!is_error(result), "unexpected error reply: {}", text(result));
    serde_json::from_str(text(result)).expect("reply is JSON")
}
