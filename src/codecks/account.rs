//! Account mapper: root data and card metadata.

use serde_json::{Value, json};

use super::client::CodecksClient;
use super::context::SessionContext;
use super::entities::{Account, ApiUser, Graph, Metadata};
use super::error::{CodecksError, CodecksResult};

const ACCOUNT_FIELDS: [&str; 10] = [
    "id",
    "name",
    "subdomain",
    "activeProjectCount",
    "billingEmail",
    "billingName",
    "createdAt",
    "isDisabled",
    "seats",
    "staffPermission",
];

/// What the root query resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct RootData {
    pub account: Account,
    pub user_id: String,
    pub project_id: String,
}

pub fn root_query() -> Value {
    let mut account: Vec<Value> = ACCOUNT_FIELDS.iter().map(|f| json!(f)).collect();
    account.push(json!({ "projects": ["name"] }));

    json!({
        "_root": [{
            "account": account,
            "loggedInUser": ["id"],
        }]
    })
}

/// Resolve the active account, logged-in user and working project (the
/// account's first project).
pub fn map_root(graph: &Graph) -> CodecksResult<RootData> {
    let account_id = graph.root_id("account")?;
    let account: Account = graph
        .entity("account", account_id)?
        .ok_or_else(|| CodecksError::not_found(format!("account '{account_id}' missing from response")))?;

    let user_ref = graph.root_id("loggedInUser")?;
    let user_id = graph
        .entity::<ApiUser>("user", user_ref)?
        .map(|u| u.id)
        .unwrap_or_else(|| user_ref.to_string());

    let project_id = account
        .projects
        .first()
        .cloned()
        .ok_or_else(|| CodecksError::not_found(format!("account '{}' has no projects", account.name)))?;

    Ok(RootData {
        account,
        user_id,
        project_id,
    })
}

pub async fn fetch_root(client: &CodecksClient) -> CodecksResult<RootData> {
    let graph: Graph = client.query(&root_query()).await?;
    map_root(&graph)
}

pub fn metadata_query(account_id: &str) -> Value {
    let key = format!("account({account_id})");
    json!({ key: ["effortScale", "priorityLabels"] })
}

pub fn map_metadata(graph: &Graph, account_id: &str) -> CodecksResult<Metadata> {
    graph
        .entity("account", account_id)?
        .ok_or_else(|| CodecksError::not_found(format!("no metadata for account '{account_id}'")))
}

pub async fn fetch_metadata(client: &CodecksClient, account_id: &str) -> CodecksResult<Metadata> {
    let graph: Graph = client.query(&metadata_query(account_id)).await?;
    map_metadata(&graph, account_id)
}

/// Account record held by the session.
pub fn current_account(ctx: &SessionContext) -> CodecksResult<Account> {
    Ok(ctx.session()?.account.clone())
}
