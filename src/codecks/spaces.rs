//! Project spaces mapper.

use serde_json::{Value, json};

use super::client::CodecksClient;
use super::context::SessionContext;
use super::entities::{ApiProject, Graph, Space};
use super::error::{CodecksError, CodecksResult};

pub fn list_query(project_id: &str) -> Value {
    let key = format!("project({project_id})");
    json!({ key: ["spaces"] })
}

pub fn map_spaces(graph: &Graph, project_id: &str) -> CodecksResult<Vec<Space>> {
    graph
        .entity::<ApiProject>("project", project_id)?
        .and_then(|project| project.spaces)
        .ok_or_else(|| CodecksError::not_found(format!("no spaces found for project '{project_id}'")))
}

pub async fn list_spaces(client: &CodecksClient, ctx: &SessionContext) -> CodecksResult<Vec<Space>> {
    let project_id = &ctx.session()?.project_id;
    let graph: Graph = client.query(&list_query(project_id)).await?;
    map_spaces(&graph, project_id)
}
