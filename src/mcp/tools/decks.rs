//! MCP tools for decks.

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, schemars,
    schemars::JsonSchema, tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::codecks::CardType;
use crate::codecks::decks;
use crate::mcp::server::{CodecksServer, reply};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeckParams {
    #[schemars(description = "Deck name")]
    pub name: String,
    #[schemars(description = "Space the deck is created in. Use list-spaces to find space ids.")]
    pub space_id: u64,
    #[schemars(
        description = "Card types the deck accepts: 'hero', 'task', 'doc'. Optional, defaults to all three."
    )]
    pub allowed_card_types: Option<Vec<CardType>>,
}

#[tool_router(router = deck_router, vis = "pub(crate)")]
impl CodecksServer {
    #[tool(
        name = "list-decks",
        description = "List all decks of the account as {id, name}. Use this to find the deckId for card tools."
    )]
    pub async fn list_decks(&self) -> Result<CallToolResult, McpError> {
        let result = match self.session() {
            Ok(_) => decks::list_decks(&self.client).await,
            Err(e) => Err(e),
        };
        reply("list-decks", result)
    }

    #[tool(
        name = "create-deck",
        description = "Create a deck in the working project. Requires a spaceId from list-spaces."
    )]
    pub async fn create_deck(
        &self,
        params: Parameters<CreateDeckParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateDeckParams {
            name,
            space_id,
            allowed_card_types,
        } = params.0;
        let result =
            decks::create_deck(&self.client, &self.context, &name, space_id, allowed_card_types)
                .await;
        reply("create-deck", result)
    }
}
