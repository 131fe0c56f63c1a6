//! Wire types for the Codecks API and the flat records handed to tools.
//!
//! The query endpoint answers with a normalized graph: a `_root` object of
//! pointers plus one map per entity kind keyed by server-assigned id.
//! [`Graph`] keeps those maps in response order so mappers can walk them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rmcp::{schemars, schemars::JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::error::{CodecksError, CodecksResult};

// =============================================================================
// Graph envelope
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Graph {
    #[serde(rename = "_root", default)]
    pub root: Map<String, Value>,
    #[serde(flatten)]
    pub kinds: Map<String, Value>,
}

impl Graph {
    /// Resolve a `_root` pointer to the id it references.
    pub fn root_id(&self, key: &str) -> CodecksResult<&str> {
        self.root
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| CodecksError::not_found(format!("response has no _root.{key} pointer")))
    }

    /// Raw entry for `kind[id]`.
    pub fn raw(&self, kind: &str, id: &str) -> Option<&Value> {
        self.kinds.get(kind)?.as_object()?.get(id)
    }

    /// Decode `kind[id]`, or `None` when absent.
    pub fn entity<T: DeserializeOwned>(&self, kind: &str, id: &str) -> CodecksResult<Option<T>> {
        match self.raw(kind, id) {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }

    /// Decode every entry of `kind` in response order, paired with its id.
    pub fn entities<T: DeserializeOwned>(&self, kind: &str) -> CodecksResult<Vec<(String, T)>> {
        let Some(map) = self.kinds.get(kind).and_then(Value::as_object) else {
            return Ok(Vec::new());
        };
        map.iter()
            .map(|(id, value)| -> CodecksResult<(String, T)> {
                Ok((id.clone(), T::deserialize(value)?))
            })
            .collect()
    }

    /// Id list stored under a relation key of `kind[id]`, e.g. an account's
    /// `cards({...})` relation.
    pub fn relation_ids(&self, kind: &str, id: &str, relation: &str) -> Option<Vec<String>> {
        let ids = self.raw(kind, id)?.get(relation)?.as_array()?;
        Some(
            ids.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }
}

// =============================================================================
// Account, user, metadata
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub subdomain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_project_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_permission: Option<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
}

/// Server-defined card options for the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub effort_scale: Option<Vec<Number>>,
    #[serde(default)]
    pub priority_labels: Option<BTreeMap<String, String>>,
}

// =============================================================================
// Decks and spaces
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiDeck {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
}

/// `decks/create` answers either with the deck record or with an action
/// envelope carrying only the new id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreateDeckResponse {
    Record { id: String, title: String },
    Envelope { payload: CreatedId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_allowed_card_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiProject {
    #[serde(default)]
    pub spaces: Option<Vec<Space>>,
}

// =============================================================================
// Cards
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Hero,
    Task,
    Doc,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Hero, CardType::Task, CardType::Doc];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    NotStarted,
    Started,
    Done,
    Blocked,
    Review,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::NotStarted => "not_started",
            CardStatus::Started => "started",
            CardStatus::Done => "done",
            CardStatus::Blocked => "blocked",
            CardStatus::Review => "review",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(CardStatus::NotStarted),
            "started" => Ok(CardStatus::Started),
            "done" => Ok(CardStatus::Done),
            "blocked" => Ok(CardStatus::Blocked),
            "review" => Ok(CardStatus::Review),
            other => Err(format!("unknown card status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Default,
    Archived,
}

/// Card as stored in the graph's `card` map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCard {
    pub card_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub is_doc: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub derived_status: Option<String>,
    #[serde(default)]
    pub last_updated_at: Option<String>,
    #[serde(default, rename = "count:attachments", alias = "countAttachments")]
    pub count_attachments: Option<u64>,
    #[serde(default, rename = "count:childCards")]
    pub count_child_cards: Option<u64>,
    #[serde(default)]
    pub has_blocking_deps: Option<bool>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub master_tags: Option<Vec<String>>,
    #[serde(default)]
    pub effort: Option<Number>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub account_seq: Option<u64>,
    #[serde(default)]
    pub checkbox_stats: Option<Value>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub deck_id: Option<String>,
}

/// Flat card record returned by the card tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub card_type: CardType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_attachments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_blocking_deps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub master_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox_stats: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedId {
    pub id: String,
}

/// Envelope returned by `cards/create`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardResponse {
    pub payload: CreatedId,
    #[serde(default)]
    pub action_id: Option<String>,
}

/// Outcome of a card lookup: the chosen card and how many matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMatch {
    pub card: Card,
    pub match_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Confirmation for destructive operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub success: bool,
    pub card_id: String,
}
