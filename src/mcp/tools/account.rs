//! MCP tools for the account.

use rmcp::{ErrorData as McpError, model::CallToolResult, tool, tool_router};

use crate::codecks::account::current_account;
use crate::mcp::server::{CodecksServer, reply, reply_text};

#[tool_router(router = account_router, vis = "pub(crate)")]
impl CodecksServer {
    #[tool(
        name = "get-account-name",
        description = "Get the display name of the Codecks account this server is connected to."
    )]
    pub async fn get_account_name(&self) -> Result<CallToolResult, McpError> {
        let result = current_account(&self.context).map(|account| account.name);
        reply_text("get-account-name", result)
    }

    #[tool(
        name = "get-account",
        description = "Get the full account record: id, name, subdomain, billing and seat attributes, and project ids."
    )]
    pub async fn get_account(&self) -> Result<CallToolResult, McpError> {
        reply("get-account", current_account(&self.context))
    }
}
