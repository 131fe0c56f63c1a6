//! MCP tools for cards.

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, schemars,
    schemars::JsonSchema, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::codecks::cards::{self, CardFilter, CardLookup, CardPatch, NewCard};
use crate::codecks::{CardStatus, CardType, CodecksError, CodecksResult, Visibility};
use crate::mcp::server::{CodecksServer, reply};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardParams {
    #[schemars(description = "Deck the card is created in. Use list-decks to find deck ids.")]
    pub deck_id: String,
    #[schemars(description = "Card title (single line)")]
    pub title: String,
    #[schemars(description = "Card description (optional)")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[schemars(
        description = "Card type: 'task' (default) or 'doc'. Hero cards are formed by attaching child cards, not created directly."
    )]
    pub card_type: Option<CardType>,
    #[schemars(description = "User id to assign (optional)")]
    pub assignee_id: Option<String>,
    #[schemars(
        description = "Priority code (optional). Allowed codes are listed by get-card-options."
    )]
    pub priority: Option<String>,
    #[schemars(
        description = "Effort estimate (optional). Must be on the effort scale from get-card-options when the account defines one."
    )]
    pub effort: Option<Number>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetCardParams {
    #[schemars(description = "Exact card id. Provide this or cardTitle, not both.")]
    pub card_id: Option<String>,
    #[schemars(
        description = "Substring of the card title. The first match is returned, with a warning when several cards match."
    )]
    pub card_title: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListCardsParams {
    #[schemars(description = "Deck to list cards from")]
    pub deck_id: String,
    #[schemars(
        description = "Filter by status: 'not_started', 'started', 'done', 'blocked', 'review'"
    )]
    pub status: Option<CardStatus>,
    #[schemars(description = "Filter by assigned user id")]
    pub assignee_id: Option<String>,
    #[serde(rename = "type")]
    #[schemars(description = "Filter by card type: 'hero', 'task', 'doc'")]
    pub card_type: Option<CardType>,
    #[schemars(description = "List archived cards instead of active ones")]
    pub is_archived: Option<bool>,
    #[schemars(description = "Maximum number of cards to return (default: 20, max: 100)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardParams {
    #[schemars(description = "Card id to update")]
    pub card_id: String,
    #[schemars(description = "New title (optional)")]
    pub title: Option<String>,
    #[schemars(description = "New description (optional)")]
    pub description: Option<String>,
    #[schemars(description = "User id to assign (optional). Empty string removes the assignee.")]
    pub assignee_id: Option<String>,
    #[schemars(
        description = "Priority code (optional). Allowed codes are listed by get-card-options. Empty string clears it."
    )]
    pub priority: Option<String>,
    #[schemars(
        description = "Effort estimate (optional). Must be on the effort scale from get-card-options when the account defines one."
    )]
    pub effort: Option<Number>,
    #[schemars(
        description = "Status (optional): 'not_started', 'started', 'done', 'blocked', 'review'"
    )]
    pub status: Option<CardStatus>,
    #[schemars(description = "Visibility (optional): 'default' or 'archived'")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCardParams {
    #[schemars(description = "Card id to delete")]
    pub card_id: String,
}

impl GetCardParams {
    fn lookup(self) -> CodecksResult<CardLookup> {
        match (self.card_id, self.card_title) {
            (Some(id), None) if !id.is_empty() => Ok(CardLookup::Id(id)),
            (None, Some(title)) if !title.is_empty() => Ok(CardLookup::Title(title)),
            _ => Err(CodecksError::validation(
                "provide exactly one of cardId or cardTitle",
            )),
        }
    }
}

impl From<CreateCardParams> for NewCard {
    fn from(p: CreateCardParams) -> Self {
        NewCard {
            deck_id: p.deck_id,
            title: p.title,
            description: p.description,
            card_type: p.card_type,
            assignee_id: p.assignee_id,
            priority: p.priority,
            effort: p.effort,
        }
    }
}

impl From<ListCardsParams> for CardFilter {
    fn from(p: ListCardsParams) -> Self {
        CardFilter {
            deck_id: p.deck_id,
            status: p.status,
            assignee_id: p.assignee_id,
            card_type: p.card_type,
            archived: p.is_archived.unwrap_or(false),
            limit: p.limit,
        }
    }
}

impl From<UpdateCardParams> for CardPatch {
    fn from(p: UpdateCardParams) -> Self {
        CardPatch {
            card_id: p.card_id,
            title: p.title,
            description: p.description,
            assignee_id: p.assignee_id,
            priority: p.priority,
            effort: p.effort,
            status: p.status,
            visibility: p.visibility,
        }
    }
}

// =============================================================================
// Card Tools
// =============================================================================

#[tool_router(router = card_router, vis = "pub(crate)")]
impl CodecksServer {
    #[tool(
        name = "create-card",
        description = "Create a card in a deck and return the stored card. Call get-card-options first to see the allowed effort values and priority codes."
    )]
    pub async fn create_card(
        &self,
        params: Parameters<CreateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = cards::create_card(&self.client, &self.context, params.0.into()).await;
        reply("create-card", result)
    }

    #[tool(
        name = "get-card",
        description = "Get one card by exact cardId or by a substring of its title (cardTitle). Replies {card, matchCount, warning?}."
    )]
    pub async fn get_card(
        &self,
        params: Parameters<GetCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.session().and_then(|_| params.0.lookup()) {
            Ok(lookup) => cards::get_card(&self.client, &lookup).await,
            Err(e) => Err(e),
        };
        reply("get-card", result)
    }

    #[tool(
        name = "list-cards",
        description = "List cards in a deck, oldest first. Filter by status, assigneeId, type or isArchived. limit defaults to 20 (max 100)."
    )]
    pub async fn list_cards(
        &self,
        params: Parameters<ListCardsParams>,
    ) -> Result<CallToolResult, McpError> {
        let filter = CardFilter::from(params.0);
        let result = match self.session() {
            Ok(_) => cards::list_cards(&self.client, &filter).await,
            Err(e) => Err(e),
        };
        reply("list-cards", result)
    }

    #[tool(
        name = "update-card",
        description = "Update a card. Only the fields you pass are changed; omitted fields keep their current value. Call get-card-options first to see the allowed effort values and priority codes."
    )]
    pub async fn update_card(
        &self,
        params: Parameters<UpdateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = cards::update_card(&self.client, &self.context, params.0.into()).await;
        reply("update-card", result)
    }

    #[tool(name = "delete-card", description = "Delete a card by id.")]
    pub async fn delete_card(
        &self,
        params: Parameters<DeleteCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.session() {
            Ok(_) => cards::delete_card(&self.client, &params.0.card_id).await,
            Err(e) => Err(e),
        };
        reply("delete-card", result)
    }

    #[tool(
        name = "get-card-options",
        description = "Get the account's allowed effort values (effortScale) and priority codes (priorityLabels). Empty when the account defines none."
    )]
    pub async fn get_card_options(&self) -> Result<CallToolResult, McpError> {
        let result = self.session().map(|_| cards::card_options(&self.context));
        reply("get-card-options", result)
    }
}
