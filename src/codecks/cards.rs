//! Card mapper.
//!
//! Cards store title and description as a single `content` blob: the title
//! on the first line, then a blank line and the description. Reads split it
//! back apart, so the title that was sent is the title read back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};
use tracing::warn;

use super::client::CodecksClient;
use super::context::SessionContext;
use super::entities::{
    ApiCard, Card, CardMatch, CardStatus, CardType, CreateCardResponse, Deleted, Graph, Visibility,
};
use super::error::{CodecksError, CodecksResult};
use super::validation::{MAX_LIST_LIMIT, validate_effort, validate_limit, validate_priority};

/// Fields requested for every card read.
pub const CARD_FIELDS: [&str; 20] = [
    "cardId",
    "title",
    "content",
    "visibility",
    "isDoc",
    "status",
    "derivedStatus",
    "lastUpdatedAt",
    "count:attachments",
    "count:childCards",
    "hasBlockingDeps",
    "meta",
    "dueDate",
    "masterTags",
    "effort",
    "priority",
    "accountSeq",
    "checkboxStats",
    "assigneeId",
    "deckId",
];

fn card_fields() -> Value {
    json!(CARD_FIELDS)
}

// =============================================================================
// Content and record mapping
// =============================================================================

pub fn compose_content(title: &str, description: Option<&str>) -> String {
    match description {
        Some(d) if !d.is_empty() => format!("{title}\n\n{d}"),
        _ => title.to_string(),
    }
}

/// Split a content blob into its title line and optional description.
pub fn split_content(content: &str) -> (String, Option<String>) {
    match content.split_once('\n') {
        Some((title, rest)) => {
            let description = rest.trim_start_matches(['\n', '\r']);
            (
                title.trim_end_matches('\r').to_string(),
                (!description.is_empty()).then(|| description.to_string()),
            )
        }
        None => (content.to_string(), None),
    }
}

pub fn card_type_of(card: &ApiCard) -> CardType {
    if card.is_doc.unwrap_or(false) {
        CardType::Doc
    } else if card.count_child_cards.unwrap_or(0) > 0 {
        CardType::Hero
    } else {
        CardType::Task
    }
}

pub fn map_card(id: &str, api: ApiCard) -> Card {
    let card_type = card_type_of(&api);
    let (content_title, description) = api
        .content
        .as_deref()
        .map(split_content)
        .unwrap_or_default();
    let title = api
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or(content_title);

    let status = api.status.as_deref().and_then(|s| match s.parse::<CardStatus>() {
        Ok(status) => Some(status),
        Err(e) => {
            warn!(card_id = id, "{e}");
            None
        }
    });

    Card {
        id: api.card_id.unwrap_or_else(|| id.to_string()),
        title,
        description,
        content: api.content,
        card_type,
        status,
        visibility: api.visibility,
        derived_status: api.derived_status,
        assignee_id: api.assignee_id,
        priority: api.priority,
        deck_id: api.deck_id,
        effort: api.effort,
        last_updated_at: api.last_updated_at,
        count_attachments: api.count_attachments,
        has_blocking_deps: api.has_blocking_deps,
        due_date: api.due_date,
        master_tags: api.master_tags.unwrap_or_default(),
        account_seq: api.account_seq,
        meta: api.meta,
        checkbox_stats: api.checkbox_stats,
    }
}

/// Cards listed under the account's `relation`, in relation order. Falls back
/// to the order of the `card` map when the relation is absent.
fn cards_in_relation(graph: &Graph, relation: &str) -> CodecksResult<Vec<Card>> {
    let ids = graph
        .root_id("account")
        .ok()
        .and_then(|account_id| graph.relation_ids("account", account_id, relation));

    match ids {
        Some(ids) => ids
            .iter()
            .filter_map(|id| match graph.entity::<ApiCard>("card", id) {
                Ok(Some(api)) => Some(Ok(map_card(id, api))),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            })
            .collect(),
        None => Ok(graph
            .entities::<ApiCard>("card")?
            .into_iter()
            .map(|(id, api)| map_card(&id, api))
            .collect()),
    }
}

fn account_cards_query(relation: &str) -> Value {
    let mut selection = Map::new();
    selection.insert(relation.to_string(), card_fields());
    json!({
        "_root": [{
            "account": [Value::Object(selection)]
        }]
    })
}

fn cards_relation(filter: &Map<String, Value>) -> String {
    format!("cards({})", Value::Object(filter.clone()))
}

fn validate_title(title: &str) -> CodecksResult<()> {
    if title.trim().is_empty() {
        return Err(CodecksError::validation("card title is required"));
    }
    if title.contains('\n') {
        return Err(CodecksError::validation("card title must be a single line"));
    }
    Ok(())
}

// =============================================================================
// Get
// =============================================================================

/// How to find a single card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardLookup {
    Id(String),
    Title(String),
}

pub fn lookup_query(lookup: &CardLookup) -> (Value, String) {
    match lookup {
        CardLookup::Id(id) => {
            let key = format!("card({id})");
            (json!({ key.clone(): card_fields() }), key)
        }
        CardLookup::Title(title) => {
            let mut filter = Map::new();
            filter.insert("title".into(), json!({ "op": "contains", "value": title }));
            let relation = cards_relation(&filter);
            (account_cards_query(&relation), relation)
        }
    }
}

pub async fn get_card(client: &CodecksClient, lookup: &CardLookup) -> CodecksResult<CardMatch> {
    let (query, relation) = lookup_query(lookup);
    let graph: Graph = client.query(&query).await?;

    match lookup {
        CardLookup::Id(id) => {
            let api: ApiCard = graph
                .entity("card", id)?
                .ok_or_else(|| CodecksError::not_found(format!("no card with id '{id}'")))?;
            Ok(CardMatch {
                card: map_card(id, api),
                match_count: 1,
                warning: None,
            })
        }
        CardLookup::Title(title) => {
            let mut cards = cards_in_relation(&graph, &relation)?;
            if cards.is_empty() {
                return Err(CodecksError::not_found(format!(
                    "no card found with title containing '{title}'"
                )));
            }
            let match_count = cards.len();
            let warning = (match_count > 1).then(|| {
                format!(
                    "{match_count} cards matched '{title}'; returning the first. Use cardId for an exact match."
                )
            });
            Ok(CardMatch {
                card: cards.remove(0),
                match_count,
                warning,
            })
        }
    }
}

async fn get_card_by_id(client: &CodecksClient, card_id: &str) -> CodecksResult<Card> {
    get_card(client, &CardLookup::Id(card_id.to_string()))
        .await
        .map(|m| m.card)
}

// =============================================================================
// List
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFilter {
    pub deck_id: String,
    pub status: Option<CardStatus>,
    pub assignee_id: Option<String>,
    pub card_type: Option<CardType>,
    pub archived: bool,
    pub limit: Option<u32>,
}

/// Query plus the relation key it selects under the account.
pub fn list_query(filter: &CardFilter, limit: u32) -> (Value, String) {
    let mut conditions = Map::new();
    conditions.insert("deckId".into(), json!(filter.deck_id));
    if let Some(status) = filter.status {
        conditions.insert("status".into(), json!(status));
    }
    if let Some(assignee_id) = &filter.assignee_id {
        conditions.insert("assigneeId".into(), json!(assignee_id));
    }
    if let Some(card_type) = filter.card_type {
        conditions.insert("isDoc".into(), json!(card_type == CardType::Doc));
    }
    if filter.archived {
        conditions.insert("visibility".into(), json!("archived"));
    }
    conditions.insert("$order".into(), json!("createdAt"));
    conditions.insert("$limit".into(), json!(limit));

    let relation = cards_relation(&conditions);
    (account_cards_query(&relation), relation)
}

/// List the cards of a deck matching `filter`, oldest first.
///
/// The limit is validated before any remote call. `isDoc` only separates docs
/// from the rest, so a hero or task filter is applied locally; in that case
/// the query asks for [`MAX_LIST_LIMIT`] cards and the result is cut down to
/// the requested limit afterwards, so heroes cannot crowd tasks out of a
/// small page (and the other way round).
pub async fn list_cards(client: &CodecksClient, filter: &CardFilter) -> CodecksResult<Vec<Card>> {
    let limit = validate_limit(filter.limit)?;
    let fetch = match filter.card_type {
        Some(CardType::Hero | CardType::Task) => MAX_LIST_LIMIT,
        _ => limit,
    };
    let (query, relation) = list_query(filter, fetch);
    let graph: Graph = client.query(&query).await?;

    let mut cards = cards_in_relation(&graph, &relation)?;
    if let Some(card_type) = filter.card_type {
        cards.retain(|c| c.card_type == card_type);
    }
    cards.truncate(limit as usize);
    Ok(cards)
}

// =============================================================================
// Create
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCard {
    pub deck_id: String,
    pub title: String,
    pub description: Option<String>,
    pub card_type: Option<CardType>,
    pub assignee_id: Option<String>,
    pub priority: Option<String>,
    pub effort: Option<Number>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCardPayload {
    deck_id: String,
    content: String,
    project_id: String,
    user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effort: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_doc: Option<bool>,
}

pub async fn create_card(
    client: &CodecksClient,
    ctx: &SessionContext,
    card: NewCard,
) -> CodecksResult<Card> {
    let session = ctx.session()?;
    let metadata = ctx.metadata();

    validate_title(&card.title)?;
    if card.card_type == Some(CardType::Hero) {
        return Err(CodecksError::validation(
            "hero cards cannot be created directly; create a task and attach child cards to it",
        ));
    }
    let priority = card
        .priority
        .as_deref()
        .map(|p| validate_priority(metadata.as_ref(), p).map(str::to_string))
        .transpose()?;
    let effort = card
        .effort
        .map(|e| validate_effort(metadata.as_ref(), e))
        .transpose()?;

    let payload = CreateCardPayload {
        deck_id: card.deck_id,
        content: compose_content(&card.title, card.description.as_deref()),
        project_id: session.project_id.clone(),
        user_id: session.user_id.clone(),
        assignee_id: card.assignee_id,
        priority,
        effort,
        is_doc: (card.card_type == Some(CardType::Doc)).then_some(true),
    };

    let created: CreateCardResponse = client.dispatch("cards/create", &payload).await?;
    get_card_by_id(client, &created.payload.id).await
}

// =============================================================================
// Update
// =============================================================================

/// Sparse update: `None` means "not supplied" and is never sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub card_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    pub priority: Option<String>,
    pub effort: Option<Number>,
    pub status: Option<CardStatus>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateCardPayload {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effort: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CardStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<Visibility>,
}

impl UpdateCardPayload {
    fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.assignee_id.is_none()
            && self.priority.is_none()
            && self.effort.is_none()
            && self.status.is_none()
            && self.visibility.is_none()
    }
}

/// An empty string clears a nullable reference.
fn clearable(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

pub async fn update_card(
    client: &CodecksClient,
    ctx: &SessionContext,
    patch: CardPatch,
) -> CodecksResult<Card> {
    ctx.session()?;
    let metadata = ctx.metadata();

    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    let priority = match patch.priority {
        Some(p) if p.is_empty() => Some(None),
        Some(p) => Some(Some(validate_priority(metadata.as_ref(), &p)?.to_string())),
        None => None,
    };
    let effort = patch
        .effort
        .map(|e| validate_effort(metadata.as_ref(), e))
        .transpose()?;

    // Title and description share one blob; recover whichever half is missing.
    let content = match (patch.title, patch.description) {
        (None, None) => None,
        (Some(title), Some(description)) => Some(compose_content(&title, Some(&description))),
        (title, description) => {
            let current = get_card_by_id(client, &patch.card_id).await?;
            let title = title.unwrap_or(current.title);
            let description = description.or(current.description);
            Some(compose_content(&title, description.as_deref()))
        }
    };

    let payload = UpdateCardPayload {
        id: patch.card_id,
        content,
        assignee_id: patch.assignee_id.map(clearable),
        priority,
        effort,
        status: patch.status,
        visibility: patch.visibility,
    };
    if payload.is_empty() {
        return Err(CodecksError::validation("no fields supplied to update"));
    }

    let _: Value = client.dispatch("cards/update", &payload).await?;
    get_card_by_id(client, &payload.id).await
}

// =============================================================================
// Delete and options
// =============================================================================

pub async fn delete_card(client: &CodecksClient, card_id: &str) -> CodecksResult<Deleted> {
    let _: Value = client.dispatch("cards/delete", &json!({ "id": card_id })).await?;
    Ok(Deleted {
        success: true,
        card_id: card_id.to_string(),
    })
}

/// Allowed effort values and priority labels, empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOptions {
    pub effort_scale: Vec<Number>,
    pub priority_labels: BTreeMap<String, String>,
}

pub fn card_options(ctx: &SessionContext) -> CardOptions {
    let metadata = ctx.metadata().unwrap_or_default();
    CardOptions {
        effort_scale: metadata.effort_scale.unwrap_or_default(),
        priority_labels: metadata.priority_labels.unwrap_or_default(),
    }
}
