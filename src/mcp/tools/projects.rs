//! MCP tools for the working project.

use rmcp::{ErrorData as McpError, model::CallToolResult, tool, tool_router};

use crate::codecks::spaces::list_spaces;
use crate::mcp::server::{CodecksServer, reply};

#[tool_router(router = project_router, vis = "pub(crate)")]
impl CodecksServer {
    #[tool(
        name = "list-spaces",
        description = "List the spaces of the working project as {id, name, defaultAllowedCardTypes}."
    )]
    pub async fn list_spaces(&self) -> Result<CallToolResult, McpError> {
        reply("list-spaces", list_spaces(&self.client, &self.context).await)
    }
}
