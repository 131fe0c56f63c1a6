//! In-process fake of the Codecks API used by tests.
//!
//! Understands the query shapes this crate sends (root data, metadata, decks,
//! spaces, card lookups and card listings) plus the four dispatch actions,
//! keeps cards and decks in memory and records every request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::client::CodecksClient;
use super::context::SessionContext;
use super::entities::Account;
use crate::config::Config;

pub(crate) const ACCOUNT_ID: &str = "acc-1";
pub(crate) const USER_ID: &str = "user-1";
pub(crate) const PROJECT_ID: &str = "proj-1";
pub(crate) const SUBDOMAIN: &str = "acme";
pub(crate) const TOKEN: &str = "test-token";

pub(crate) fn init_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

pub(crate) fn test_account() -> Account {
    Account {
        id: ACCOUNT_ID.to_string(),
        name: "Acme Games".to_string(),
        subdomain: SUBDOMAIN.to_string(),
        active_project_count: Some(1),
        billing_email: None,
        billing_name: None,
        created_at: None,
        is_disabled: Some(false),
        seats: Some(5),
        staff_permission: None,
        projects: vec![PROJECT_ID.to_string()],
    }
}

/// Context as it looks after a successful startup, without metadata.
pub(crate) fn ready_context() -> SessionContext {
    let ctx = SessionContext::new();
    ctx.initialize(test_account(), USER_ID, PROJECT_ID)
        .expect("fresh context initializes");
    ctx
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub path: String,
    pub account_header: Option<String>,
    pub token_header: Option<String>,
    pub body: Value,
}

#[derive(Debug)]
pub(crate) struct FakeState {
    pub account: Value,
    pub metadata: Value,
    pub decks: Vec<(String, String)>,
    pub spaces: Option<Value>,
    pub cards: Vec<Value>,
    pub requests: Vec<RecordedRequest>,
    /// When set, every request answers with this status and body.
    pub failure: Option<(u16, String)>,
    /// When set, every request answers 200 with this raw body.
    pub raw_body: Option<String>,
    next_id: u64,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            account: serde_json::to_value(test_account()).expect("account serializes"),
            metadata: json!({ "effortScale": null, "priorityLabels": null }),
            decks: Vec::new(),
            spaces: None,
            cards: Vec::new(),
            requests: Vec::new(),
            failure: None,
            raw_body: None,
            next_id: 0,
        }
    }
}

fn first_line(content: &str) -> String {
    content.lines().next().unwrap_or_default().to_string()
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    pub fn add_deck(&mut self, title: &str) -> String {
        let id = self.next("deck");
        self.decks.push((id.clone(), title.to_string()));
        id
    }

    /// Store a card and return its id. `extra` fields are merged in.
    pub fn add_card(&mut self, deck_id: &str, content: &str, extra: Value) -> String {
        let id = self.next("card");
        let mut card = json!({
            "cardId": id,
            "title": first_line(content),
            "content": content,
            "deckId": deck_id,
            "status": "not_started",
            "visibility": "default",
            "isDoc": false,
            "accountSeq": self.next_id,
        });
        if let (Some(card), Some(extra)) = (card.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                card.insert(k.clone(), v.clone());
            }
        }
        self.cards.push(card);
        id
    }

    pub fn card(&self, id: &str) -> Option<&Value> {
        self.cards.iter().find(|c| c["cardId"] == id)
    }

    /// Bodies of every dispatch to `action`.
    pub fn dispatches(&self, action: &str) -> Vec<Value> {
        let path = format!("/dispatch/{action}");
        self.requests
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.body.clone())
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.requests.iter().filter(|r| r.path == "/").count()
    }

    fn answer_query(&self, query: &Value) -> Option<Value> {
        let query = query.as_object()?;

        if let Some(root) = query.get("_root") {
            let selection = root.get(0)?;
            if selection.get("loggedInUser").is_some() {
                return Some(self.root_graph());
            }
            for item in selection.get("account")?.as_array()? {
                let Some(item) = item.as_object() else {
                    continue;
                };
                for key in item.keys() {
                    if key == "decks" {
                        return Some(self.decks_graph());
                    }
                    if let Some(filter) = key.strip_prefix("cards(").and_then(|k| k.strip_suffix(')')) {
                        let filter: Value = serde_json::from_str(filter).ok()?;
                        return Some(self.cards_graph(key, &filter));
                    }
                }
            }
            return None;
        }

        let (key, _) = query.iter().next()?;
        let arg = |prefix: &str| {
            key.strip_prefix(prefix)
                .and_then(|k| k.strip_suffix(')'))
                .map(str::to_string)
        };

        if let Some(id) = arg("account(") {
            let mut metadata = self.metadata.clone();
            metadata["id"] = json!(id);
            return Some(json!({ "account": { id: metadata } }));
        }
        if let Some(id) = arg("project(") {
            let mut project = json!({ "id": id });
            if let Some(spaces) = &self.spaces {
                project["spaces"] = spaces.clone();
            }
            return Some(json!({ "project": { id: project } }));
        }
        if let Some(id) = arg("card(") {
            let mut cards = Map::new();
            if let Some(card) = self.card(&id) {
                cards.insert(id, card.clone());
            }
            return Some(json!({ "card": cards }));
        }
        None
    }

    fn root_graph(&self) -> Value {
        json!({
            "_root": { "account": ACCOUNT_ID, "loggedInUser": USER_ID },
            "account": { ACCOUNT_ID: self.account },
            "user": { USER_ID: { "id": USER_ID } },
            "project": { PROJECT_ID: { "name": "Main" } },
        })
    }

    fn decks_graph(&self) -> Value {
        let ids: Vec<&str> = self.decks.iter().map(|(id, _)| id.as_str()).collect();
        let mut decks = Map::new();
        for (id, title) in &self.decks {
            decks.insert(id.clone(), json!({ "title": title }));
        }
        json!({
            "_root": { "account": ACCOUNT_ID },
            "account": { ACCOUNT_ID: { "decks": ids } },
            "deck": decks,
        })
    }

    fn cards_graph(&self, relation: &str, filter: &Value) -> Value {
        let conditions = filter.as_object().cloned().unwrap_or_default();
        let matches = |card: &Value| {
            conditions.iter().all(|(k, v)| match k.as_str() {
                "$order" | "$limit" => true,
                "title" => {
                    let needle = v["value"].as_str().unwrap_or_default();
                    card["title"].as_str().unwrap_or_default().contains(needle)
                }
                "isDoc" => card["isDoc"].as_bool().unwrap_or(false) == v.as_bool().unwrap_or(false),
                other => card.get(other) == Some(v),
            })
        };
        let limit = conditions
            .get("$limit")
            .and_then(Value::as_u64)
            .unwrap_or(u64::MAX) as usize;

        let selected: Vec<&Value> = self.cards.iter().filter(|c| matches(c)).take(limit).collect();
        let ids: Vec<Value> = selected.iter().map(|c| c["cardId"].clone()).collect();
        let mut cards = Map::new();
        for card in selected {
            if let Some(id) = card["cardId"].as_str() {
                cards.insert(id.to_string(), card.clone());
            }
        }

        let mut account = Map::new();
        account.insert("id".into(), json!(ACCOUNT_ID));
        account.insert(relation.to_string(), Value::Array(ids));
        json!({
            "_root": { "account": ACCOUNT_ID },
            "account": { ACCOUNT_ID: account },
            "card": cards,
        })
    }

    fn dispatch(&mut self, action: &str, body: &Value) -> Option<Value> {
        match action {
            "cards/create" => {
                let content = body["content"].as_str()?.to_string();
                let deck_id = body["deckId"].as_str()?.to_string();
                let mut extra = Map::new();
                for key in ["assigneeId", "priority", "effort", "isDoc"] {
                    if let Some(v) = body.get(key) {
                        extra.insert(key.to_string(), v.clone());
                    }
                }
                let id = self.add_card(&deck_id, &content, Value::Object(extra));
                let action_id = self.next("action");
                Some(json!({ "payload": { "id": id }, "actionId": action_id }))
            }
            "cards/update" => {
                let id = body["id"].as_str()?.to_string();
                let card = self
                    .cards
                    .iter_mut()
                    .find(|c| c["cardId"] == id.as_str())?
                    .as_object_mut()?;
                for (k, v) in body.as_object()? {
                    if k == "id" {
                        continue;
                    }
                    if k == "content" {
                        card.insert("title".into(), json!(first_line(v.as_str().unwrap_or_default())));
                    }
                    if v.is_null() {
                        card.remove(k);
                    } else {
                        card.insert(k.clone(), v.clone());
                    }
                }
                Some(Value::Object(card.clone()))
            }
            "cards/delete" => {
                let id = body["id"].as_str()?;
                let before = self.cards.len();
                self.cards.retain(|c| c["cardId"] != id);
                (self.cards.len() < before).then(|| json!({ "success": true }))
            }
            "decks/create" => {
                let title = body["title"].as_str()?.to_string();
                let id = self.add_deck(&title);
                Some(json!({ "id": id, "title": title }))
            }
            _ => None,
        }
    }
}

type Shared = Arc<Mutex<FakeState>>;

async fn handle(State(state): State<Shared>, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.requests.push(RecordedRequest {
        path: uri.path().to_string(),
        account_header: header("x-account"),
        token_header: header("x-auth-token"),
        body: body.clone(),
    });

    if let Some((status, text)) = state.failure.clone() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, text).into_response();
    }
    if let Some(raw) = state.raw_body.clone() {
        return (StatusCode::OK, raw).into_response();
    }

    let answer = match uri.path() {
        "/" => state.answer_query(&body["query"]),
        path => match path.strip_prefix("/dispatch/") {
            Some(action) => state.dispatch(action, &body),
            None => None,
        },
    };

    match answer {
        Some(value) => Json(value).into_response(),
        None => (StatusCode::NOT_FOUND, "unknown request").into_response(),
    }
}

/// Running fake server; aborted on drop.
pub(crate) struct FakeCodecks {
    pub url: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl Drop for FakeCodecks {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeCodecks {
    pub async fn spawn() -> Self {
        Self::spawn_with(FakeState::default()).await
    }

    pub async fn spawn_with(state: FakeState) -> Self {
        let state: Shared = Arc::new(Mutex::new(state));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn config(&self) -> Config {
        Config::new(SUBDOMAIN, TOKEN, &self.url, 5).unwrap()
    }

    pub fn client(&self) -> CodecksClient {
        init_crypto();
        CodecksClient::new(&self.config()).unwrap()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
