//! Startup protocol.
//!
//! Runs once before any tool is callable: resolve account, user and project,
//! seed the session context, then attach card metadata. Any failure is fatal.

use tracing::info;

use super::account;
use super::client::CodecksClient;
use super::context::SessionContext;
use super::error::{CodecksError, CodecksResult};

/// Run the startup protocol against a fresh context.
///
/// # Returns
///
/// The initialized context, or [`CodecksError::Startup`] naming the step
/// that failed.
pub async fn bootstrap(client: &CodecksClient) -> CodecksResult<SessionContext> {
    let ctx = SessionContext::new();
    initialize_context(client, &ctx).await?;
    Ok(ctx)
}

/// Resolve root data, seed `ctx`, then attach metadata.
pub async fn initialize_context(client: &CodecksClient, ctx: &SessionContext) -> CodecksResult<()> {
    info!(subdomain = client.subdomain(), "initializing Codecks context");

    let root = account::fetch_root(client)
        .await
        .map_err(|e| CodecksError::startup("fetching root data", e))?;
    let account_id = root.account.id.clone();

    info!(
        account = %root.account.name,
        user_id = %root.user_id,
        project_id = %root.project_id,
        "resolved root data"
    );

    ctx.initialize(root.account, root.user_id, root.project_id)
        .map_err(|e| CodecksError::startup("initializing session context", e))?;

    let metadata = account::fetch_metadata(client, &account_id)
        .await
        .map_err(|e| CodecksError::startup("fetching card metadata", e))?;
    ctx.attach_metadata(metadata);

    info!("Codecks context initialized");
    Ok(())
}
