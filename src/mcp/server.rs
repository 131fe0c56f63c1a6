//! MCP server coordinator.
//!
//! Holds the remote client and the session context, and combines the
//! per-resource tool routers into one. Tool results are rendered as
//! pretty-printed JSON; every `CodecksError` becomes an error reply so the
//! host never sees a failed invocation.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool_handler,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::codecks::{CodecksClient, CodecksError, CodecksResult, Session, SessionContext};

const INSTRUCTIONS: &str = "Codecks MCP Server - Manage decks, cards and spaces of a Codecks account.\n\n\
Start with list-decks to find a deckId, then list-cards or create-card. \
Call get-card-options before setting effort or priority: the account decides which values are allowed. \
list-spaces returns the spaceId required by create-deck.";

#[derive(Clone)]
pub struct CodecksServer {
    pub(crate) client: Arc<CodecksClient>,
    pub(crate) context: Arc<SessionContext>,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl CodecksServer {
    /// Creates the server and registers every tool.
    ///
    /// # Arguments
    ///
    /// * `client` - Authenticated client used by all tools
    /// * `context` - Session context; tools reply with an illegal-state error
    ///   until it has been initialized
    ///
    /// # Returns
    ///
    /// A server ready to be handed to an rmcp transport.
    pub fn new(client: CodecksClient, context: SessionContext) -> Self {
        Self {
            client: Arc::new(client),
            context: Arc::new(context),
            tool_router: Self::account_router()
                + Self::deck_router()
                + Self::card_router()
                + Self::project_router(),
        }
    }

    /// The initialized session; every tool checks this before doing any work.
    pub(crate) fn session(&self) -> CodecksResult<&Session> {
        self.context.session()
    }
}

/// Render `result` as a JSON reply, or as an error reply on failure.
pub(crate) fn reply<T: Serialize>(
    tool: &str,
    result: CodecksResult<T>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            debug!(tool, "tool call succeeded");
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(e) => Ok(error_reply(tool, &e)),
    }
}

/// Like [`reply`], for tools whose result is already plain text.
pub(crate) fn reply_text(tool: &str, result: CodecksResult<String>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => {
            debug!(tool, "tool call succeeded");
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(e) => Ok(error_reply(tool, &e)),
    }
}

pub(crate) fn error_reply(tool: &str, error: &CodecksError) -> CallToolResult {
    warn!(tool, %error, "tool call failed");
    CallToolResult::error(vec![Content::text(format!("Error: {error}"))])
}

#[tool_handler]
impl ServerHandler for CodecksServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_instructions(INSTRUCTIONS)
    }
}
