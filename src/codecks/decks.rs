//! Deck mapper.

use serde::Serialize;
use serde_json::{Value, json};

use super::client::CodecksClient;
use super::context::SessionContext;
use super::entities::{ApiDeck, CardType, CreateDeckResponse, Deck, Graph};
use super::error::{CodecksError, CodecksResult};

pub fn list_query() -> Value {
    json!({
        "_root": [{
            "account": [{ "decks": ["title"] }]
        }]
    })
}

/// Decks in response order.
pub fn map_decks(graph: &Graph) -> CodecksResult<Vec<Deck>> {
    Ok(graph
        .entities::<ApiDeck>("deck")?
        .into_iter()
        .map(|(id, deck)| Deck {
            id,
            name: deck.title,
        })
        .collect())
}

pub async fn list_decks(client: &CodecksClient) -> CodecksResult<Vec<Deck>> {
    let graph: Graph = client.query(&list_query()).await?;
    map_decks(&graph)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateDeckPayload<'a> {
    title: &'a str,
    cover_file_data: Option<String>,
    project_id: &'a str,
    user_id: &'a str,
    space_id: u64,
    allowed_card_types: Vec<CardType>,
}

pub async fn create_deck(
    client: &CodecksClient,
    ctx: &SessionContext,
    name: &str,
    space_id: u64,
    allowed_card_types: Option<Vec<CardType>>,
) -> CodecksResult<Deck> {
    let session = ctx.session()?;

    let title = name.trim();
    if title.is_empty() {
        return Err(CodecksError::validation("deck name is required"));
    }
    let allowed_card_types = allowed_card_types.unwrap_or_else(|| CardType::ALL.to_vec());
    if allowed_card_types.is_empty() {
        return Err(CodecksError::validation(
            "allowedCardTypes must contain at least one card type",
        ));
    }

    let payload = CreateDeckPayload {
        title,
        cover_file_data: None,
        project_id: &session.project_id,
        user_id: &session.user_id,
        space_id,
        allowed_card_types,
    };

    let response: CreateDeckResponse = client.dispatch("decks/create", &payload).await?;

    Ok(match response {
        CreateDeckResponse::Record { id, title } => Deck { id, name: title },
        CreateDeckResponse::Envelope { payload } => Deck {
            id: payload.id,
            name: title.to_string(),
        },
    })
}
